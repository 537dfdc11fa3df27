// Table creation is logged whichever constructor is used.
use keyed_table::KeyedTable;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct Capture(Mutex<Vec<(Level, String)>>);

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.0
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

fn take() -> Vec<(Level, String)> {
    std::mem::take(&mut *CAPTURE.0.lock().unwrap())
}

#[test]
fn every_constructor_logs_creation() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let created = (Level::Trace, "created keyed table with 16 slots".to_string());

    let _ = take();
    let t: KeyedTable<u8> = KeyedTable::new();
    assert!(take().contains(&created));

    let _d: KeyedTable<u8> = KeyedTable::default();
    assert!(take().contains(&created));

    let _s: KeyedTable<u8> = KeyedTable::with_slots(16).unwrap();
    assert!(take().contains(&created));

    t.destroy();
    assert!(take()
        .iter()
        .any(|(lvl, msg)| *lvl == Level::Trace && msg.starts_with("destroying keyed table")));
}
