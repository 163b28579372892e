use crate::compositor::Frame;
use crate::error::Result;

/// Receives every composited frame.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// Keeps the most recent frame; handy when presentation happens elsewhere.
#[derive(Debug, Default)]
pub struct LatestFrame {
    pub frame: Option<Frame>,
    pub presented: usize,
}

impl FrameSink for LatestFrame {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frame = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        (**self).present(frame)
    }
}
