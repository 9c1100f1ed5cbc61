/// One successful detection exchange. Each new success replaces the
/// previous value wholesale; a failed request leaves it untouched.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Annotated image as returned by the backend (JPEG bytes).
    pub annotated_image: Vec<u8>,
    /// Object count reported out-of-band in the response header.
    pub object_count: u64,
}
