use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use compadmin_types::MethodFailure;

use crate::component::{Component, EventSet, Property};
use crate::registry::Registry;

/// Small component the binary serves when nothing else is plugged in.
/// Its operations cover every parameter type the admin form can send.
#[derive(Debug)]
pub struct Greeter {
    name: RwLock<String>,
    greeting: RwLock<String>,
    greeted: AtomicI64,
    scale: RwLock<f64>,
    listeners: RwLock<Vec<String>>,
}

impl Default for Greeter {
    fn default() -> Self {
        Self {
            name: RwLock::new("world".to_owned()),
            greeting: RwLock::new("Hello".to_owned()),
            greeted: AtomicI64::new(0),
            scale: RwLock::new(1.0),
            listeners: RwLock::new(Vec::new()),
        }
    }
}

impl Greeter {
    pub fn registry() -> Registry<Greeter> {
        let mut reg = Registry::new();
        reg.register0("greet", Greeter::greet);
        reg.register1("greet", Greeter::greet_times);
        reg.register1("setName", Greeter::set_name);
        reg.register2("setGreeting", Greeter::set_greeting);
        reg.register1("setScale", Greeter::set_scale);
        reg.register1("scaleBy", Greeter::scale_by);
        reg.register1("addToCount", Greeter::add_to_count);
        reg.register1("addListener", Greeter::add_listener);
        reg.register0("reset", Greeter::reset);
        reg
    }

    pub fn greeted(&self) -> i64 {
        self.greeted.load(Ordering::Relaxed)
    }

    pub fn greet(&self) -> Result<String, MethodFailure> {
        let msg = format!("{}, {}!", self.greeting.read()?, self.name.read()?);
        self.greeted.fetch_add(1, Ordering::Relaxed);
        Ok(msg)
    }

    pub fn greet_times(&self, times: i32) -> Result<Vec<String>, MethodFailure> {
        if times < 0 {
            return Err(MethodFailure::new(format!("cannot greet {} times", times)));
        }
        (0..times).map(|_| self.greet()).collect()
    }

    pub fn set_name(&self, name: String) -> Result<(), MethodFailure> {
        if name.trim().is_empty() {
            return Err(MethodFailure::new("name must not be blank"));
        }
        *self.name.write()? = name;
        Ok(())
    }

    /// Sets the greeting, repeating its last character `stretch` extra times.
    pub fn set_greeting(&self, greeting: String, stretch: i32) -> Result<(), MethodFailure> {
        let stretch = usize::try_from(stretch).map_err(|_| MethodFailure::new("stretch must be >= 0"))?;
        let mut g = greeting;
        if let Some(last) = g.chars().last() {
            g.extend(std::iter::repeat(last).take(stretch));
        }
        *self.greeting.write()? = g;
        Ok(())
    }

    pub fn set_scale(&self, scale: f64) -> Result<(), MethodFailure> {
        if !scale.is_finite() {
            return Err(MethodFailure::new(format!("scale {} is not finite", scale)));
        }
        *self.scale.write()? = scale;
        Ok(())
    }

    pub fn scale_by(&self, factor: f32) -> Result<f64, MethodFailure> {
        let mut scale = self.scale.write()?;
        *scale *= f64::from(factor);
        Ok(*scale)
    }

    pub fn add_to_count(&self, n: i64) -> Result<i64, MethodFailure> {
        Ok(self.greeted.fetch_add(n, Ordering::Relaxed) + n)
    }

    pub fn add_listener(&self, listener: String) -> Result<usize, MethodFailure> {
        let mut listeners = self.listeners.write()?;
        listeners.push(listener);
        Ok(listeners.len())
    }

    pub fn reset(&self) -> Result<(), MethodFailure> {
        let fresh = Self::default();
        *self.name.write()? = fresh.name.into_inner()?;
        *self.greeting.write()? = fresh.greeting.into_inner()?;
        *self.scale.write()? = fresh.scale.into_inner()?;
        self.listeners.write()?.clear();
        self.greeted.store(0, Ordering::Relaxed);
        Ok(())
    }
}

impl Component for Greeter {
    fn name(&self) -> &str {
        "Greeter"
    }

    fn description(&self) -> Option<&str> {
        Some("Greets whoever it is told to.")
    }

    fn properties(&self) -> Vec<Property> {
        let read = |lock: &RwLock<String>| match lock.read() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let scale = match self.scale.read() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        };
        vec![
            Property::new("name", read(&self.name)).describe("who gets greeted"),
            Property::new("greeting", read(&self.greeting)),
            Property::new("greetCount", self.greeted()).describe("greetings issued so far"),
            Property::new("scale", scale),
        ]
    }

    fn event_sets(&self) -> Vec<EventSet> {
        let listeners = match self.listeners.read() {
            Ok(l) => l.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        vec![EventSet {
            name: "greeting".to_owned(),
            listeners,
        }]
    }
}
