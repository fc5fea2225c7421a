use crate::http::headers::Headers;

/// Progress of a [`Request`] through parsing. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestState {
    Initialized,
    ParsingHeaders,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    /// Version number without the `HTTP/` prefix, always `1.1`.
    pub http_version: String,
}

#[derive(Debug)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub(crate) state: RequestState,
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            state: RequestState::Initialized,
        }
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == RequestState::Done
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}
