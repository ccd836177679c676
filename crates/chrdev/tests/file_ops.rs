//! Read/write contract of device sessions.

use std::sync::Arc;

use chrdev::{
    ChrdevError, ChrdevSubsystem, DEFAULT_PAYLOAD, DEVICE_BUFFER_SIZE, DeviceRegistry, LogTickSink,
    ModuleParams, OpenFlags, OperationDispatcher, RegionTable,
};

fn subsystem(num_dev: u32) -> ChrdevSubsystem {
    ChrdevSubsystem::init(
        ModuleParams::new(num_dev, 0).unwrap(),
        Arc::new(RegionTable::new()),
        Arc::new(LogTickSink),
    )
    .unwrap()
}

#[test]
fn test_write_then_read_roundtrip() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let session = fops.open(sys.major(), 0, OpenFlags::O_RDWR).unwrap();

    let payload = b"THIS IS A SAMPLE CHARACTER DEVICE DRIVER\n";
    assert_eq!(fops.write(&session, payload), Ok(payload.len()));

    let mut buf = vec![0u8; payload.len()];
    assert_eq!(fops.read(&session, &mut buf), Ok(payload.len()));
    assert_eq!(buf, payload);
}

#[test]
fn test_repeated_reads_are_identical() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let session = fops.open(sys.major(), 0, OpenFlags::O_RDWR).unwrap();
    fops.write(&session, b"stable").unwrap();

    let mut first = [0u8; 32];
    let n1 = fops.read(&session, &mut first).unwrap();
    for _ in 0..5 {
        let mut again = [0u8; 32];
        let n = fops.read(&session, &mut again).unwrap();
        assert_eq!(n, n1);
        assert_eq!(again, first);
    }
}

#[test]
fn test_write_at_capacity_and_one_past() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let session = fops.open(sys.major(), 0, OpenFlags::O_RDWR).unwrap();

    let full = vec![b'C'; DEVICE_BUFFER_SIZE];
    assert_eq!(fops.write(&session, &full), Ok(DEVICE_BUFFER_SIZE));
    assert_eq!(session.device().len(), DEVICE_BUFFER_SIZE);

    let over = vec![b'D'; DEVICE_BUFFER_SIZE + 1];
    assert_eq!(fops.write(&session, &over), Err(ChrdevError::BufferOverflow));
    // Rejected writes leave the previous contents in place.
    assert_eq!(session.device().snapshot(), full);
}

#[test]
fn test_short_read_is_not_an_error() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let session = fops.open(sys.major(), 0, OpenFlags::O_RDWR).unwrap();
    fops.write(&session, b"AB").unwrap();

    let mut buf = [0xffu8; 16];
    assert_eq!(fops.read(&session, &mut buf), Ok(2));
    assert_eq!(&buf[..2], b"AB");
    assert!(buf[2..].iter().all(|&b| b == 0xff));
}

#[test]
fn test_two_devices_scenario() {
    let sys = subsystem(2);
    let fops = sys.dispatcher();

    let s0 = fops.open(sys.major(), 0, OpenFlags::O_RDWR).unwrap();
    fops.write(&s0, b"AB").unwrap();
    let s1 = fops.open(sys.major(), 1, OpenFlags::O_RDWR).unwrap();
    fops.write(&s1, b"CD").unwrap();

    let mut buf = [0u8; 2];
    fops.read(&s0, &mut buf).unwrap();
    assert_eq!(&buf, b"AB");
    fops.read(&s1, &mut buf).unwrap();
    assert_eq!(&buf, b"CD");
}

#[test]
fn test_fresh_device_reads_default_payload() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let session = fops.open(sys.major(), 0, OpenFlags::O_RDONLY).unwrap();
    let mut buf = [0u8; DEVICE_BUFFER_SIZE];
    let n = fops.read(&session, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"Default string\n");
}

#[test]
fn test_default_payload_truncated_to_small_capacity() {
    let reg =
        DeviceRegistry::create_with_capacity(Arc::new(RegionTable::new()), 0, 1, 7).unwrap();
    let fops = OperationDispatcher::new(&reg);
    let session = fops.open(reg.major(), 0, OpenFlags::O_RDWR).unwrap();
    let mut buf = [0u8; 32];
    let n = fops.read(&session, &mut buf).unwrap();
    assert_eq!(&buf[..n], &DEFAULT_PAYLOAD[..7]);
    assert_eq!(fops.write(&session, b"12345678"), Err(ChrdevError::BufferOverflow));
}

#[test]
fn test_isolation_across_devices() {
    let sys = subsystem(4);
    let fops = sys.dispatcher();
    let sessions: Vec<_> = (0..4)
        .map(|i| fops.open(sys.major(), i, OpenFlags::O_RDWR).unwrap())
        .collect();

    fops.write(&sessions[2], b"only two").unwrap();
    for (i, session) in sessions.iter().enumerate() {
        let mut buf = [0u8; 32];
        let n = fops.read(session, &mut buf).unwrap();
        if i == 2 {
            assert_eq!(&buf[..n], b"only two");
        } else {
            assert_eq!(&buf[..n], DEFAULT_PAYLOAD);
        }
    }
}

#[test]
fn test_sessions_on_same_device_share_buffer() {
    let sys = subsystem(1);
    let fops = sys.dispatcher();
    let writer = fops.open(sys.major(), 0, OpenFlags::O_WRONLY).unwrap();
    let reader = fops.open(sys.major(), 0, OpenFlags::O_RDONLY).unwrap();

    fops.write(&writer, b"shared").unwrap();
    let mut buf = [0u8; 6];
    fops.read(&reader, &mut buf).unwrap();
    assert_eq!(&buf, b"shared");
}
