use std::time::Duration;

use numberstation_control::{
    Animation, ArtNetConfig, Fixture, FixtureProfile, Rgb, Transmitter, TransmitterState,
};
use tokio::net::UdpSocket;
use tokio::time::timeout;

async fn listener() -> (UdpSocket, ArtNetConfig) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let config = ArtNetConfig {
        host: "127.0.0.1".to_string(),
        port: socket.local_addr().unwrap().port(),
        universe: 1,
        universe_size: 264,
        refresh_rate_hz: 50,
    };
    (socket, config)
}

fn patched(config: &ArtNetConfig) -> Transmitter {
    let transmitter = Transmitter::new(config).unwrap();
    for segment in 0..88 {
        transmitter.add_fixture(Fixture::new(FixtureProfile::rgb(), 1 + 3 * segment));
    }
    transmitter
}

async fn receive(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = vec![0u8; 1024];
    let len = timeout(Duration::from_secs(2), socket.recv(&mut buf))
        .await
        .expect("no frame received")
        .unwrap();
    buf.truncate(len);
    buf
}

#[tokio::test]
async fn test_running_transmitter_sends_frames() {
    let (socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter
        .set_animation(Animation::steady(Rgb::new(255, 255, 255)))
        .await;
    assert_eq!(transmitter.state(), TransmitterState::Running);

    let packet = receive(&socket).await;
    assert_eq!(packet.len(), 18 + 264);
    assert!(packet[18..].iter().all(|&value| value == 64));

    transmitter.set_animation(Animation::Off).await;
}

#[tokio::test]
async fn test_off_sends_black_frame_and_stops() {
    let (socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter
        .set_animation(Animation::steady(Rgb::new(255, 0, 0)))
        .await;
    receive(&socket).await;

    transmitter.set_animation(Animation::Off).await;
    assert_eq!(transmitter.state(), TransmitterState::Off);
    assert!(transmitter
        .frame_snapshot()
        .as_slice()
        .iter()
        .all(|&value| value == 0));

    // The last frame on the wire is the black one
    let mut last = receive(&socket).await;
    while let Ok(Ok(len)) = timeout(Duration::from_millis(50), socket.recv(&mut last)).await {
        last.truncate(len);
    }
    assert!(last[18..].iter().all(|&value| value == 0));

    let sent = transmitter.frames_sent();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(transmitter.frames_sent(), sent);
}

#[tokio::test]
async fn test_black_frame_header() {
    let (socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter.set_animation(Animation::Off).await;
    let packet = receive(&socket).await;

    let mut expected = Vec::new();
    expected.extend_from_slice(b"Art-Net\0");
    expected.extend_from_slice(&[0x00, 0x50]);
    expected.extend_from_slice(&[0x00, 0x0E]);
    expected.push(1);
    expected.push(0);
    expected.extend_from_slice(&[0x01, 0x00]);
    expected.extend_from_slice(&[0x01, 0x08]);
    expected.extend(std::iter::repeat(0).take(264));

    assert_eq!(packet, expected);
    assert_eq!(transmitter.sequence(), 2);
}

#[tokio::test]
async fn test_restart_after_off() {
    let (socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter.set_animation(Animation::Off).await;
    receive(&socket).await;

    transmitter
        .set_animation(Animation::steady(Rgb::new(0, 0, 255)))
        .await;
    assert_eq!(transmitter.state(), TransmitterState::Running);

    let packet = receive(&socket).await;
    assert_eq!(&packet[18..21], &[0, 0, 64]);

    transmitter.set_animation(Animation::Off).await;
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let (_socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter.start();
    transmitter.start();
    assert_eq!(transmitter.state(), TransmitterState::Running);

    transmitter.set_animation(Animation::Off).await;
    assert_eq!(transmitter.state(), TransmitterState::Off);
}

#[tokio::test]
async fn test_set_color_reapplies_named_animation() {
    let (_socket, config) = listener().await;
    let transmitter = patched(&config);

    transmitter.set_animation_by_name("steady").await.unwrap();
    transmitter.set_color(Rgb::new(0, 255, 0)).await.unwrap();

    assert_eq!(*transmitter.animation(), Animation::steady(Rgb::new(0, 255, 0)));
    transmitter.set_animation(Animation::Off).await;
}
