//! MiniJinja implementation of the template engine port.
//!
//! One `compile` call builds a fresh `Environment`: the function table is
//! installed first, then every named source is added eagerly so syntax
//! errors surface at build time, per template name. Template names in the
//! tree carry no file extension, so MiniJinja's suffix-based auto-escape
//! heuristic would never fire — escaping is forced to HTML for every member
//! instead, since this layer fronts HTML templating.

use std::io::Write;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{AutoEscape, Environment, ErrorKind};
use serde_json::Value;
use tracing::{debug, instrument};

use veneer_core::{
    application::{
        ApplicationError,
        ports::{CompiledTemplates, NamedSource, TemplateEngine},
    },
    domain::{FunctionTable, TemplateFunction},
    error::VeneerResult,
};

/// Production template engine backed by MiniJinja.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    /// Create a new MiniJinja engine adapter.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for MiniJinjaEngine {
    #[instrument(skip_all, fields(templates = sources.len()))]
    fn compile(
        &self,
        sources: Vec<NamedSource>,
        functions: &FunctionTable,
    ) -> VeneerResult<Box<dyn CompiledTemplates>> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for (name, function) in functions.iter() {
            install_function(&mut env, name, Arc::clone(function));
        }

        for NamedSource { name, source } in sources {
            env.add_template_owned(name.clone(), source)
                .map_err(|e| ApplicationError::TemplateParse {
                    name,
                    reason: describe(&e),
                })?;
        }

        debug!("minijinja environment compiled");
        Ok(Box::new(MiniJinjaTree { env }))
    }
}

struct MiniJinjaTree {
    env: Environment<'static>,
}

impl CompiledTemplates for MiniJinjaTree {
    fn render(&self, name: &str, data: &Value, sink: &mut dyn Write) -> VeneerResult<()> {
        let template = self.env.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                ApplicationError::TemplateNotFound {
                    name: name.to_owned(),
                }
            } else {
                ApplicationError::RenderFailed {
                    name: name.to_owned(),
                    reason: describe(&e),
                }
            }
        })?;

        template
            .render_to_write(data, &mut *sink)
            .map_err(|e| ApplicationError::RenderFailed {
                name: name.to_owned(),
                reason: describe(&e),
            })?;
        Ok(())
    }

    fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .env
            .templates()
            .map(|(name, _)| name.to_owned())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Bridge one engine-agnostic function into MiniJinja's calling convention.
fn install_function(env: &mut Environment<'static>, name: &str, function: TemplateFunction) {
    let fn_name = name.to_owned();
    env.add_function(
        fn_name.clone(),
        move |args: Rest<minijinja::Value>| -> Result<minijinja::Value, minijinja::Error> {
            let mut values = Vec::with_capacity(args.0.len());
            for arg in &args.0 {
                values.push(serde_json::to_value(arg).map_err(|e| {
                    minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        format!("argument to '{fn_name}' is not serializable: {e}"),
                    )
                })?);
            }
            let output = function(&values).map_err(|reason| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("function '{fn_name}' failed: {reason}"),
                )
            })?;
            Ok(minijinja::Value::from_serialize(&output))
        },
    );
}

/// Flatten a MiniJinja error and its cause chain into one line.
fn describe(error: &minijinja::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use veneer_core::error::VeneerError;

    fn compile(sources: &[(&str, &str)], functions: FunctionTable) -> Box<dyn CompiledTemplates> {
        MiniJinjaEngine::new()
            .compile(
                sources
                    .iter()
                    .map(|(name, source)| NamedSource {
                        name: (*name).to_owned(),
                        source: (*source).to_owned(),
                    })
                    .collect(),
                &functions,
            )
            .unwrap()
    }

    fn render(tree: &dyn CompiledTemplates, name: &str, data: &Value) -> String {
        let mut out = Vec::new();
        tree.render(name, data, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_named_templates_with_context() {
        let tree = compile(
            &[("hello", "Hello {{ name }}!")],
            FunctionTable::new(),
        );
        assert_eq!(
            render(tree.as_ref(), "hello", &json!({ "name": "world" })),
            "Hello world!"
        );
    }

    #[test]
    fn templates_can_reference_each_other_by_name() {
        let tree = compile(
            &[
                ("page", "{% include 'header' %}body"),
                ("header", "<header/>"),
            ],
            FunctionTable::new(),
        );
        assert_eq!(
            render(tree.as_ref(), "page", &json!({})),
            "<header/>body"
        );
    }

    #[test]
    fn html_auto_escape_is_forced() {
        let tree = compile(&[("page", "{{ payload }}")], FunctionTable::new());
        assert_eq!(
            render(tree.as_ref(), "page", &json!({ "payload": "<b>" })),
            "&lt;b&gt;"
        );
    }

    #[test]
    fn syntax_errors_fail_compilation_with_the_member_name() {
        let result = MiniJinjaEngine::new().compile(
            vec![NamedSource {
                name: "broken".into(),
                source: "{% if %}".into(),
            }],
            &FunctionTable::new(),
        );
        let Err(err) = result else {
            panic!("expected compilation to fail");
        };
        match err {
            VeneerError::Application(ApplicationError::TemplateParse { name, .. }) => {
                assert_eq!(name, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_member_is_template_not_found() {
        let tree = compile(&[("hello", "hi")], FunctionTable::new());
        let mut out = Vec::new();
        let err = tree.render("ghost", &json!({}), &mut out).unwrap_err();
        assert!(matches!(
            err,
            VeneerError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn registered_functions_are_callable_from_templates() {
        let mut functions = FunctionTable::new();
        functions
            .insert(
                "shout".into(),
                Arc::new(|args: &[Value]| {
                    let input = args
                        .first()
                        .and_then(Value::as_str)
                        .ok_or_else(|| "expected a string".to_owned())?;
                    Ok(json!(input.to_uppercase()))
                }),
            )
            .unwrap();

        let tree = compile(&[("page", "{{ shout(word) }}")], functions);
        assert_eq!(
            render(tree.as_ref(), "page", &json!({ "word": "quiet" })),
            "QUIET"
        );
    }

    #[test]
    fn function_failures_surface_as_render_errors() {
        let mut functions = FunctionTable::new();
        functions
            .insert(
                "boom".into(),
                Arc::new(|_: &[Value]| Err("deliberate".to_owned())),
            )
            .unwrap();

        let tree = compile(&[("page", "{{ boom() }}")], functions);
        let mut out = Vec::new();
        let err = tree.render("page", &json!({}), &mut out).unwrap_err();
        match err {
            VeneerError::Application(ApplicationError::RenderFailed { name, reason }) => {
                assert_eq!(name, "page");
                assert!(reason.contains("deliberate"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn template_names_are_sorted() {
        let tree = compile(&[("zeta", ""), ("alpha", "")], FunctionTable::new());
        assert_eq!(tree.template_names(), vec!["alpha", "zeta"]);
    }
}
