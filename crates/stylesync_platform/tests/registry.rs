use serde_json::Value;
use std::sync::{Arc, Mutex};
use stylesync_platform::{
    kinds, CssResponse, HandlerId, HostTransport, InboundMessage, LocalTransport, MessageHandler,
};

/// Deregisters itself the first time it sees a message.
struct OneShot {
    transport: Arc<LocalTransport>,
    id: Mutex<Option<HandlerId>>,
    seen: Mutex<Vec<InboundMessage>>,
}

impl MessageHandler for OneShot {
    fn handle_message(&self, kind: &str, payload: Option<&Value>) -> bool {
        if let Ok(Some(message)) = InboundMessage::decode(kind, payload) {
            self.seen.lock().unwrap().push(message);
        }
        if let Some(id) = self.id.lock().unwrap().take() {
            self.transport.remove_handler(id).unwrap();
        }
        true
    }
}

#[test]
fn handler_can_deregister_while_being_dispatched() {
    let transport = Arc::new(LocalTransport::new());
    let handler = Arc::new(OneShot {
        transport: Arc::clone(&transport),
        id: Mutex::new(None),
        seen: Mutex::new(Vec::new()),
    });
    let id = transport.add_handler(handler.clone()).unwrap();
    *handler.id.lock().unwrap() = Some(id);

    let response = InboundMessage::StyleResponse(CssResponse::new("a{}", "Dark+"));
    assert_eq!(transport.deliver_inbound(&response), 1);
    assert_eq!(transport.deliver_inbound(&response), 0);

    assert_eq!(*handler.seen.lock().unwrap(), vec![response]);
    assert_eq!(transport.registry().deregistrations(), 1);
}

#[test]
fn typed_delivery_matches_raw_delivery() {
    let transport = Arc::new(LocalTransport::new());
    let handler = Arc::new(OneShot {
        transport: Arc::clone(&transport),
        id: Mutex::new(None),
        seen: Mutex::new(Vec::new()),
    });
    transport.add_handler(handler.clone()).unwrap();

    let settings = InboundMessage::SettingsUpdate(r#"{"extraSettings":{"theme":"x"}}"#.into());
    transport.deliver_inbound(&settings);
    transport.deliver(
        kinds::UPDATE_SETTINGS,
        Some(&Value::String(r#"{"extraSettings":{"theme":"x"}}"#.into())),
    );

    let seen = handler.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
}
