/// Receive path for frames a zero-copy driver hands to the IP task.
pub trait FrameHandler: Send + Sync {
    /// Called with the payload of one received frame. The bytes are only
    /// valid for the duration of the call.
    fn handle_frame(&self, frame: &[u8]);
}
