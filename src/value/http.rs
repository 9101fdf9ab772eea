//! HTTP request/response snapshots rendered as known external records.

use std::rc::Rc;

use super::{Inspect, Mapping, ReprError, Value};

fn headers_value(headers: &[(String, String)]) -> Value {
    let mut map = Mapping::with_type_name("headers");
    for (name, value) in headers {
        map.insert(name.as_str(), value.as_str());
    }
    Value::map(map)
}

#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Option<Value>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn params(mut self, params: impl Into<Value>) -> Self {
        self.params = Some(params.into());
        self
    }
}

impl Inspect for HttpRequest {
    fn type_name(&self) -> String {
        "HttpRequest".to_string()
    }

    fn repr(&self) -> Result<String, ReprError> {
        Ok(format!("<HttpRequest [{}]>", self.method))
    }

    fn known_attributes(&self) -> Option<Vec<(String, Value)>> {
        let mut attrs = vec![
            ("method".to_string(), Value::from(self.method.as_str())),
            ("url".to_string(), Value::from(self.url.as_str())),
            ("headers".to_string(), headers_value(&self.headers)),
        ];
        // Optional parts only appear when present.
        if let Some(params) = &self.params {
            attrs.push(("params".to_string(), params.clone()));
        }
        if let Some(body) = &self.body {
            attrs.push(("body".to_string(), body.clone()));
        }
        Some(attrs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub url: String,
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub content: Vec<u8>,
    pub request: Option<Rc<HttpRequest>>,
    /// Redirect responses that led to this one, oldest first.
    pub history: Vec<Rc<HttpResponse>>,
}

impl HttpResponse {
    pub fn new(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status_code,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn request(mut self, request: HttpRequest) -> Self {
        self.request = Some(Rc::new(request));
        self
    }

    pub fn redirected_from(mut self, previous: HttpResponse) -> Self {
        self.history.push(Rc::new(previous));
        self
    }
}

impl Inspect for HttpResponse {
    fn type_name(&self) -> String {
        "HttpResponse".to_string()
    }

    fn repr(&self) -> Result<String, ReprError> {
        Ok(format!("<HttpResponse [{}]>", self.status_code))
    }

    fn known_attributes(&self) -> Option<Vec<(String, Value)>> {
        let mut attrs = vec![("url".to_string(), Value::from(self.url.as_str()))];
        if let Some(request) = &self.request {
            let request: Rc<dyn Inspect> = request.clone();
            attrs.push(("request".to_string(), Value::Object(request)));
        }
        if !self.history.is_empty() {
            let history = self.history.iter().map(|previous| {
                let previous: Rc<dyn Inspect> = previous.clone();
                Value::Object(previous)
            });
            attrs.push(("history".to_string(), Value::list(history)));
        }
        attrs.push(("status_code".to_string(), Value::from(self.status_code)));
        attrs.push(("headers".to_string(), headers_value(&self.headers)));
        attrs.push(("content".to_string(), Value::bytes(self.content.clone())));
        Some(attrs)
    }
}
