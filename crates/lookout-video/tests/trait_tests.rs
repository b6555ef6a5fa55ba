use lookout_video::{CaptureError, CaptureSource, Frame};

// Mock source that fails after a fixed number of frames
struct FlakySource {
    remaining: usize,
}

impl CaptureSource for FlakySource {
    fn is_available(&self) -> bool {
        self.remaining > 0
    }

    async fn capture(&mut self) -> Result<Frame, CaptureError> {
        if self.remaining == 0 {
            return Err(CaptureError::Device("unplugged".to_string()));
        }
        self.remaining -= 1;
        Frame::new(2, 2, 1, vec![self.remaining as u8; 4])
    }
}

async fn drain(source: &mut impl CaptureSource) -> (usize, CaptureError) {
    let mut count = 0;
    loop {
        match source.capture().await {
            Ok(_) => count += 1,
            Err(e) => return (count, e),
        }
    }
}

#[tokio::test]
async fn test_capture_source_polymorphism() {
    let mut source = FlakySource { remaining: 3 };
    let (count, error) = drain(&mut source).await;
    assert_eq!(count, 3);
    assert!(!source.is_available());
    assert_eq!(error.to_string(), "device error: unplugged");
}

#[test]
fn test_error_display() {
    assert_eq!(CaptureError::Exhausted.to_string(), "capture source exhausted");
    assert_eq!(CaptureError::Unavailable.to_string(), "capture source unavailable");
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no /dev/video0");
    match CaptureError::from(io) {
        CaptureError::Device(msg) => assert!(msg.contains("/dev/video0")),
        other => panic!("Expected Device, got {:?}", other),
    }
}
