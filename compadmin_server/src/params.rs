use crate::dispatch::Invocation;

pub const CANCEL_METHOD_INVOCATION: &str = "cancelMethodInvocation";
pub const PROPERTY_NAME: &str = "propertyName";
pub const EVENT_SET_NAME: &str = "eventSetName";
pub const INVOKE_METHOD: &str = "invokeMethod";
pub const METHOD_SIG: &str = "methodSig";
pub const FIELD_VALUE: &str = "fieldValue";
pub const SHOULD_INVOKE_METHOD: &str = "shouldInvokeMethod";
pub const RELOAD_COMPONENT: &str = "reloadComponent";

/// Request parameters, query string first, then any url-encoded form body.
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn parse(query: Option<&str>, body: Option<&[u8]>) -> Result<Self, serde_urlencoded::de::Error> {
        let mut pairs: Vec<(String, String)> = match query {
            Some(q) => serde_urlencoded::from_str(q)?,
            None => Vec::new(),
        };
        if let Some(body) = body {
            let form: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
            pairs.extend(form);
        }
        Ok(Self(pairs))
    }

    /// First value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Picks what to do with the request. Checks run in a fixed order and the
    /// first parameter present wins.
    pub fn action(&self) -> Action<'_> {
        if self.get(CANCEL_METHOD_INVOCATION).is_some() {
            return Action::Default;
        }
        if let Some(name) = self.get(PROPERTY_NAME) {
            return Action::Property(name);
        }
        if let Some(name) = self.get(EVENT_SET_NAME) {
            return Action::EventSet(name);
        }
        if let Some(method) = self.get(INVOKE_METHOD) {
            return Action::Invoke(Invocation {
                method,
                signature: self.get(METHOD_SIG),
                args: self.get(FIELD_VALUE),
            });
        }
        if let Some(method) = self.get(SHOULD_INVOKE_METHOD) {
            return Action::Confirm(method);
        }
        if self.get(RELOAD_COMPONENT).is_some() {
            return Action::Reload;
        }
        Action::Default
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    Default,
    Property(&'a str),
    EventSet(&'a str),
    Invoke(Invocation<'a>),
    Confirm(&'a str),
    Reload,
}
