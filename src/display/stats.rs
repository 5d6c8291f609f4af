/// Display output counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub render_errors: u64,
}

impl DisplayStats {
    pub fn record_frame_render(&mut self) {
        self.frames_rendered += 1;
    }

    pub fn record_skip(&mut self) {
        self.frames_skipped += 1;
    }

    pub fn record_render_error(&mut self) {
        self.render_errors += 1;
    }
}
