/// What came back from the health endpoint once the body was fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == 200
    }
}
