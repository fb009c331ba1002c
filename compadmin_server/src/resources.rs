use std::fmt::Display;

use indexmap::IndexMap;

pub const PAGE_TITLE: &str = "pageTitle";
pub const METHOD_INVOKED_HDR: &str = "methodInvokedHdr";
pub const INVOCATION_FAILED: &str = "invocationFailed";
pub const PROPERTIES_HDR: &str = "propertiesHdr";
pub const EVENT_SETS_HDR: &str = "eventSetsHdr";
pub const OPERATIONS_HDR: &str = "operationsHdr";
pub const NO_SUCH_PROPERTY: &str = "noSuchProperty";
pub const NO_SUCH_EVENT_SET: &str = "noSuchEventSet";
pub const NO_SUCH_METHOD: &str = "noSuchMethod";
pub const NO_LISTENERS: &str = "noListeners";
pub const CONFIRM_PROMPT: &str = "confirmPrompt";
pub const INVOKE_BUTTON: &str = "invokeButton";
pub const CANCEL_BUTTON: &str = "cancelButton";
pub const RELOAD_LINK: &str = "reloadLink";
pub const BACK_LINK: &str = "backLink";

const DEFAULTS: &[(&str, &str)] = &[
    (PAGE_TITLE, "{0} administration"),
    (METHOD_INVOKED_HDR, "Invoked method: {0}"),
    (INVOCATION_FAILED, "Invoking {0} failed during {1}: {2}"),
    (PROPERTIES_HDR, "Properties"),
    (EVENT_SETS_HDR, "Event sets"),
    (OPERATIONS_HDR, "Operations"),
    (NO_SUCH_PROPERTY, "{0} has no property named {1}"),
    (NO_SUCH_EVENT_SET, "{0} has no event set named {1}"),
    (NO_SUCH_METHOD, "{0} has no operation named {1}"),
    (NO_LISTENERS, "no listeners"),
    (CONFIRM_PROMPT, "Invoke {1} on {0}?"),
    (INVOKE_BUTTON, "Invoke"),
    (CANCEL_BUTTON, "Cancel"),
    (RELOAD_LINK, "Reload"),
    (BACK_LINK, "Back"),
];

/// User-facing message templates. `{n}` is replaced by the n-th argument.
#[derive(Debug, Clone)]
pub struct Resources {
    templates: IndexMap<String, String>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            templates: DEFAULTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Resources {
    pub fn with_overrides(overrides: &IndexMap<String, String>) -> Self {
        let mut res = Self::default();
        for (k, v) in overrides {
            res.templates.insert(k.clone(), v.clone());
        }
        res
    }

    /// Raw template; a missing key yields the key itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.templates.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn format(&self, key: &str, args: &[&dyn Display]) -> String {
        fill(self.get(key), args)
    }
}

// placeholders with no matching argument are left in place
fn fill(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let n: usize = after[..close].parse().ok()?;
            args.get(n).map(|a| (close, a))
        });
        match arg {
            Some((close, a)) => {
                out.push_str(&a.to_string());
                rest = &after[close + 1..];
            },
            None => {
                out.push('{');
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}
