use std::fmt::{self, Write};

use serde::Serialize;

use crate::component::Component;
use crate::dispatch::DispatchError;
use crate::params;
use crate::registry::{Method, Registry};
use crate::resources::{self as res, Resources};

/// Page furniture shared by every view. Swap it out to restyle the endpoint.
pub trait PageRenderer: Send + Sync {
    /// Text inside `<title>`.
    fn header_title(&self, out: &mut dyn Write, title: &str) -> fmt::Result;

    fn style(&self, out: &mut dyn Write) -> fmt::Result;

    fn body_tag(&self, out: &mut dyn Write) -> fmt::Result;

    /// Visible page heading.
    fn title(&self, out: &mut dyn Write, title: &str) -> fmt::Result;

    fn footer(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str("</body>\n</html>\n")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl PageRenderer for DefaultRenderer {
    fn header_title(&self, out: &mut dyn Write, title: &str) -> fmt::Result {
        write!(out, "{}", Escape(title))
    }

    fn style(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str(concat!(
            "<style>\n",
            "body { font-family: sans-serif; margin: 1em 2em; }\n",
            "table { border-collapse: collapse; }\n",
            "th, td { border: 1px solid #ccc; padding: 2px 8px; text-align: left; }\n",
            ".error { color: #b00; }\n",
            "</style>\n",
        ))
    }

    fn body_tag(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str("<body>\n")
    }

    fn title(&self, out: &mut dyn Write, title: &str) -> fmt::Result {
        writeln!(out, "<h1>{}</h1>", Escape(title))
    }
}

/// Displays text with HTML metacharacters escaped.
pub struct Escape<'a>(pub &'a str);

impl fmt::Display for Escape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (i, c) in self.0.char_indices() {
            let rep = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[last..i])?;
            f.write_str(rep)?;
            last = i + c.len_utf8();
        }
        f.write_str(&self.0[last..])
    }
}

// `?key=value` link target, relative to the current (slash-terminated) path
fn link<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<String, fmt::Error> {
    serde_urlencoded::to_string([(key, value)])
        .map(|q| format!("?{}", q))
        .map_err(|_| fmt::Error)
}

/// Builds the admin views for one component.
pub struct Pages<'a, C> {
    pub renderer: &'a dyn PageRenderer,
    pub resources: &'a Resources,
    pub component: &'a C,
    pub registry: &'a Registry<C>,
}

impl<'a, C: Component> Pages<'a, C> {
    fn page<F>(&self, body: F) -> Result<String, fmt::Error>
    where
        F: FnOnce(&mut String) -> fmt::Result,
    {
        let title = self
            .resources
            .format(res::PAGE_TITLE, &[&self.component.name()]);
        let mut out = String::new();
        out.write_str("<!doctype html>\n<html>\n<head>\n<title>")?;
        self.renderer.header_title(&mut out, &title)?;
        out.write_str("</title>\n")?;
        self.renderer.style(&mut out)?;
        out.write_str("</head>\n")?;
        self.renderer.body_tag(&mut out)?;
        self.renderer.title(&mut out, &title)?;
        body(&mut out)?;
        self.renderer.footer(&mut out)?;
        Ok(out)
    }

    fn message(&self, out: &mut String, text: &str) -> fmt::Result {
        writeln!(out, "<p>{}</p>", Escape(text))?;
        self.back(out)
    }

    fn back(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "<p><a href=\"./\">{}</a></p>",
            Escape(self.resources.get(res::BACK_LINK))
        )
    }

    fn invoke_form(&self, out: &mut String, method: &Method<C>) -> fmt::Result {
        writeln!(out, "<form method=\"post\" action=\"./\">")?;
        writeln!(
            out,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            params::INVOKE_METHOD,
            Escape(&method.name)
        )?;
        writeln!(
            out,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            params::METHOD_SIG,
            method.signature.codes()
        )?;
        if !method.signature.is_empty() {
            let hint = method
                .signature
                .tokens()
                .iter()
                .map(|tok| tok.type_name())
                .collect::<Vec<_>>()
                .join(";");
            writeln!(
                out,
                "<input type=\"text\" name=\"{}\" placeholder=\"{}\">",
                params::FIELD_VALUE,
                Escape(&hint)
            )?;
        }
        writeln!(
            out,
            "<input type=\"submit\" value=\"{}\">",
            Escape(self.resources.get(res::INVOKE_BUTTON))
        )?;
        writeln!(out, "</form>")
    }

    /// Component overview: properties, event sets and operations.
    pub fn service(&self) -> Result<String, fmt::Error> {
        self.page(|out| {
            if let Some(desc) = self.component.description() {
                writeln!(out, "<p>{}</p>", Escape(desc))?;
            }

            writeln!(out, "<h2>{}</h2>", Escape(self.resources.get(res::PROPERTIES_HDR)))?;
            writeln!(out, "<table>")?;
            for prop in self.component.properties() {
                writeln!(
                    out,
                    "<tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
                    Escape(&link(params::PROPERTY_NAME, &prop.name)?),
                    Escape(&prop.name),
                    Escape(&prop.value)
                )?;
            }
            writeln!(out, "</table>")?;

            let event_sets = self.component.event_sets();
            if !event_sets.is_empty() {
                writeln!(out, "<h2>{}</h2>", Escape(self.resources.get(res::EVENT_SETS_HDR)))?;
                writeln!(out, "<ul>")?;
                for set in event_sets {
                    writeln!(
                        out,
                        "<li><a href=\"{}\">{}</a> ({})</li>",
                        Escape(&link(params::EVENT_SET_NAME, &set.name)?),
                        Escape(&set.name),
                        set.listeners.len()
                    )?;
                }
                writeln!(out, "</ul>")?;
            }

            writeln!(out, "<h2>{}</h2>", Escape(self.resources.get(res::OPERATIONS_HDR)))?;
            writeln!(out, "<table>")?;
            for method in self.registry.methods() {
                writeln!(
                    out,
                    "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>",
                    Escape(&link(params::SHOULD_INVOKE_METHOD, &method.name)?),
                    Escape(&method.name),
                    Escape(&method.signature.to_string())
                )?;
                self.invoke_form(out, method)?;
                writeln!(out, "</td></tr>")?;
            }
            writeln!(out, "</table>")?;

            writeln!(
                out,
                "<p><a href=\"{}\">{}</a></p>",
                Escape(&link(params::RELOAD_COMPONENT, "true")?),
                Escape(self.resources.get(res::RELOAD_LINK))
            )
        })
    }

    pub fn property(&self, name: &str) -> Result<String, fmt::Error> {
        self.page(|out| match self.component.property(name) {
            Some(prop) => {
                writeln!(out, "<h2>{}</h2>", Escape(&prop.name))?;
                writeln!(out, "<pre>{}</pre>", Escape(&prop.value))?;
                if let Some(desc) = &prop.description {
                    writeln!(out, "<p>{}</p>", Escape(desc))?;
                }
                self.back(out)
            },
            None => {
                let msg = self
                    .resources
                    .format(res::NO_SUCH_PROPERTY, &[&self.component.name(), &name]);
                self.message(out, &msg)
            },
        })
    }

    pub fn event_set(&self, name: &str) -> Result<String, fmt::Error> {
        self.page(|out| match self.component.event_set(name) {
            Some(set) => {
                writeln!(out, "<h2>{}</h2>", Escape(&set.name))?;
                if set.listeners.is_empty() {
                    writeln!(out, "<p>{}</p>", Escape(self.resources.get(res::NO_LISTENERS)))?;
                } else {
                    writeln!(out, "<ul>")?;
                    for listener in &set.listeners {
                        writeln!(out, "<li>{}</li>", Escape(listener))?;
                    }
                    writeln!(out, "</ul>")?;
                }
                self.back(out)
            },
            None => {
                let msg = self
                    .resources
                    .format(res::NO_SUCH_EVENT_SET, &[&self.component.name(), &name]);
                self.message(out, &msg)
            },
        })
    }

    /// Asks before running `method`. Every overload gets its own form.
    pub fn confirm(&self, method: &str) -> Result<String, fmt::Error> {
        self.page(|out| {
            let overloads = self.registry.overloads(method);
            if overloads.is_empty() {
                let msg = self
                    .resources
                    .format(res::NO_SUCH_METHOD, &[&self.component.name(), &method]);
                return self.message(out, &msg);
            }

            let prompt = self
                .resources
                .format(res::CONFIRM_PROMPT, &[&self.component.name(), &method]);
            writeln!(out, "<p>{}</p>", Escape(&prompt))?;
            for m in overloads {
                writeln!(out, "<h3>{}{}</h3>", Escape(&m.name), Escape(&m.signature.to_string()))?;
                self.invoke_form(out, m)?;
            }
            writeln!(out, "<form method=\"post\" action=\"./\">")?;
            writeln!(
                out,
                "<input type=\"submit\" name=\"{}\" value=\"{}\">",
                params::CANCEL_METHOD_INVOCATION,
                Escape(self.resources.get(res::CANCEL_BUTTON))
            )?;
            writeln!(out, "</form>")
        })
    }

    pub fn invocation_error(&self, method: &str, err: &DispatchError) -> Result<String, fmt::Error> {
        self.page(|out| {
            let hdr = self.resources.format(res::METHOD_INVOKED_HDR, &[&method]);
            writeln!(out, "<h2>{}</h2>", Escape(&hdr))?;
            let detail = self
                .resources
                .format(res::INVOCATION_FAILED, &[&method, &err.stage, &err.source]);
            writeln!(out, "<p class=\"error\">{}</p>", Escape(&detail))?;
            self.back(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use compadmin_types::{DecodeError, InvokeError};

    use super::{DefaultRenderer, Escape, Pages};
    use crate::component::{Component, EventSet, Property};
    use crate::dispatch::{DispatchError, Stage};
    use crate::registry::Registry;
    use crate::resources::Resources;

    struct Widget;

    impl Component for Widget {
        fn name(&self) -> &str {
            "Widget<1>"
        }

        fn properties(&self) -> Vec<Property> {
            vec![Property::new("size", 3).describe("how big")]
        }

        fn event_sets(&self) -> Vec<EventSet> {
            vec![EventSet {
                name: "resized".into(),
                listeners: vec!["logger".into()],
            }]
        }
    }

    fn registry() -> Registry<Widget> {
        let mut reg = Registry::new();
        reg.register1("resize", |_: &Widget, _: i32| Ok::<_, String>(()));
        reg.register2("resize", |_: &Widget, _: i32, _: String| Ok::<_, String>(()));
        reg
    }

    fn with_pages<T>(f: impl FnOnce(&Pages<'_, Widget>) -> T) -> T {
        let registry = registry();
        let resources = Resources::default();
        let pages = Pages {
            renderer: &DefaultRenderer,
            resources: &resources,
            component: &Widget,
            registry: &registry,
        };
        f(&pages)
    }

    #[test]
    fn escape() {
        assert_eq!(
            Escape(r#"<a href="x">&'</a>"#).to_string(),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(Escape("plain ünïcode").to_string(), "plain ünïcode");
    }

    #[test]
    fn service_lists_everything() {
        let html = with_pages(|p| p.service()).unwrap();
        assert!(html.contains("Widget&lt;1&gt; administration"));
        assert!(html.contains("?propertyName=size"));
        assert!(html.contains("?eventSetName=resized"));
        assert!(html.contains("?shouldInvokeMethod=resize"));
        assert!(html.contains("value=\"0;4\""));
        assert!(html.contains("placeholder=\"i32;String\""));
        assert!(html.contains("?reloadComponent=true"));
    }

    #[test]
    fn property_and_missing_property() {
        let html = with_pages(|p| p.property("size")).unwrap();
        assert!(html.contains("<pre>3</pre>"));
        assert!(html.contains("how big"));

        let html = with_pages(|p| p.property("colour")).unwrap();
        assert!(html.contains("has no property named colour"));
    }

    #[test]
    fn event_set_listeners() {
        let html = with_pages(|p| p.event_set("resized")).unwrap();
        assert!(html.contains("<li>logger</li>"));
        let html = with_pages(|p| p.event_set("moved")).unwrap();
        assert!(html.contains("has no event set named moved"));
    }

    #[test]
    fn confirm_shows_overloads() {
        let html = with_pages(|p| p.confirm("resize")).unwrap();
        assert!(html.contains("<h3>resize(i32)</h3>"));
        assert!(html.contains("<h3>resize(i32, String)</h3>"));
        assert!(html.contains("name=\"cancelMethodInvocation\""));

        let html = with_pages(|p| p.confirm("explode")).unwrap();
        assert!(html.contains("has no operation named explode"));
    }

    #[test]
    fn error_names_method_and_cause() {
        let err = DispatchError {
            stage: Stage::SignatureDecoding,
            source: InvokeError::Decode(DecodeError::Unrecognized("99".into())),
        };
        let html = with_pages(|p| p.invocation_error("resize", &err)).unwrap();
        assert!(html.contains("Invoked method: resize"));
        assert!(html.contains("signature decoding"));
        assert!(html.contains("&quot;99&quot;"));
    }
}
