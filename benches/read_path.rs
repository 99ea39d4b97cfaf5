use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rtu_serial_link::{
    HookRegistry, MockConnector, MockSerialPort, PortConfig, RtuLink, SerialTransport,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn open_link(port: &MockSerialPort) -> SerialTransport<MockConnector> {
    let mut link = SerialTransport::with_connector(
        Arc::new(PortConfig::new("BENCH0", 115200)),
        Arc::new(HookRegistry::empty()),
        MockConnector::new(port.clone()),
    );
    link.open().unwrap();
    link.set_deadline(Instant::now() + Duration::from_secs(3600));
    link
}

pub fn bench_read_path(c: &mut Criterion) {
    let idle = MockSerialPort::new();
    let mut link = open_link(&idle);
    let mut buf = [0u8; 256];
    c.bench_function("read_idle_line", |b| {
        b.iter(|| black_box(link.read(&mut buf).unwrap()))
    });

    let mut busy = MockSerialPort::new();
    let mut link = open_link(&busy);
    let frame = [0x01, 0x03, 0x04, 0x00, 0x2a, 0x00, 0x2b, 0xfa, 0x3e];
    c.bench_function("read_full_frame", |b| {
        b.iter(|| {
            busy.enqueue_read(&frame);
            let mut out = [0u8; 9];
            link.read_full(&mut out).unwrap();
            black_box(out)
        })
    });

    let mut link = open_link(&MockSerialPort::new());
    link.set_deadline(Instant::now());
    c.bench_function("read_after_deadline", |b| {
        b.iter(|| black_box(link.read(&mut buf).is_err()))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_read_path
}
criterion_main!(benches);
