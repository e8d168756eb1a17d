//! Style block markup

/// Wrap `children` in a container whose first child is a `<style>` element
/// holding `css`.
///
/// Any `</` in the stylesheet is written as `<\/` so the text cannot close
/// the style element early.
pub fn render_style_block(container_class: &str, css: Option<&str>, children: &str) -> String {
    let css = css.unwrap_or_default().replace("</", "<\\/");
    let class = container_class.replace('&', "&amp;").replace('"', "&quot;");
    format!("<div class=\"{class}\"><style>{css}</style>{children}</div>")
}
