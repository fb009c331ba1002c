/// A live object exposed through the admin endpoint.
///
/// Handlers only ever see `&Self`, so anything an operation mutates has to
/// live behind the component's own locks or atomics.
pub trait Component: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn properties(&self) -> Vec<Property>;

    fn event_sets(&self) -> Vec<EventSet> {
        Vec::new()
    }

    fn property(&self, name: &str) -> Option<Property> {
        self.properties().into_iter().find(|p| p.name == name)
    }

    fn event_set(&self, name: &str) -> Option<EventSet> {
        self.event_sets().into_iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSet {
    pub name: String,
    pub listeners: Vec<String>,
}
