use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use vlcbkit::{
    build_controller, opcodes, EventConsumerService, LoopbackTransport, Mode, NodeConfig,
    VlcbFrame,
};

fn config_in(dir: &TempDir) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.node.node_number = 0x0104;
    config.node.module_name = "TESTNOD".to_string();
    config.events.max_events = 8;
    config.events.num_evs = 2;
    config.storage.image_path = Some(dir.path().join("node.img"));
    config
}

#[test]
fn test_learned_events_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    {
        let mut controller =
            build_controller(&config, LoopbackTransport::new(), EventConsumerService::new())
                .unwrap();
        let store = controller.event_store_mut();
        store.write_event(4, 0x0200, 9).unwrap();
        store.update_ev_hash_entry(4).unwrap();
        store.write_event_variable(4, 2, 77).unwrap();
        store.commit().unwrap();
    }

    let matched = Arc::new(Mutex::new(Vec::new()));
    let sink = matched.clone();
    let consumer = EventConsumerService::new().with_event_handler(move |slot, _: &VlcbFrame| {
        sink.lock().push(slot);
    });
    let transport = LoopbackTransport::new();
    let mut controller = build_controller(&config, transport.clone(), consumer).unwrap();

    assert_eq!(controller.event_store().event_count(), 1);
    assert_eq!(controller.event_store().read_event_variable(4, 2).unwrap(), 77);

    transport.push_inbound(VlcbFrame::new(opcodes::ACON, &[0x02, 0x00, 0x00, 0x09]).unwrap());
    controller.process();
    assert_eq!(*matched.lock(), vec![4]);
    assert!(transport.sent().is_empty());
}

#[test]
fn test_configured_identity_and_name() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let transport = LoopbackTransport::new();
    let mut controller =
        build_controller(&config, transport.clone(), EventConsumerService::new()).unwrap();

    assert_eq!(controller.identity().mode, Mode::Normal);
    assert_eq!(controller.parameters().max_events, 8);

    // Enter setup, then ask for the module name.
    transport.push_inbound(VlcbFrame::new(opcodes::MODE, &[0x01, 0x04, 0x01]).unwrap());
    transport.push_inbound(VlcbFrame::new(opcodes::RQMN, &[]).unwrap());
    while controller.process().is_some() {}

    let sent = transport.take_sent();
    let name = sent
        .iter()
        .find(|f| f.opcode() == opcodes::NAME)
        .expect("NAME reply");
    assert_eq!(name.payload(), b"TESTNOD");
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = NodeConfig::default();
    config.events.num_evs = 0;
    assert!(build_controller(&config, LoopbackTransport::new(), EventConsumerService::new()).is_err());
}
