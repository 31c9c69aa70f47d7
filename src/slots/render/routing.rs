//! Reverse-proxy (nginx) configuration.
//!
//! One `server` block per configured slot, addressed as `<slot>.<host>` and
//! proxied to the slot's container on port 8000. Absent slots produce nothing.

use crate::slots::error::RenderError;
use crate::slots::model::{Configuration, SlotName};
use crate::slots::render::{check_host, check_triple, RenderContext, GENERATED_HEADER};

/// Port the application containers listen on.
pub const BACKEND_PORT: u16 = 8000;

/// Render the nginx configuration for `config`.
pub fn render_routing(config: &Configuration, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    check_host(ctx.host)?;

    let mut out = String::from(GENERATED_HEADER);
    out.push('\n');
    for (slot, triple) in config.configured() {
        check_triple(slot, triple)?;
        out.push('\n');
        out.push_str(&server_block(slot, ctx.host));
    }
    Ok(out)
}

fn server_block(slot: SlotName, host: &str) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {slot}.{host};
    client_max_body_size 128M;

    location /static/ {{
        root /volumes;
        rewrite ^/static/(.*)$ /{slot}-static-files/$1 break;
    }}

    location / {{
        resolver 127.0.0.11 valid=30s;
        set $backend "http://{slot}:{BACKEND_PORT}";
        proxy_pass $backend;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
    }}
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DatabaseConfig, ImageConfig};
    use crate::slots::model::SlotTriple;

    fn render(config: &Configuration, host: &str) -> Result<String, RenderError> {
        let database = DatabaseConfig::default();
        let images = ImageConfig::default();
        let ctx = RenderContext {
            host,
            database: &database,
            images: &images,
        };
        render_routing(config, &ctx)
    }

    #[test]
    fn test_single_slot_exact_output() {
        let config = Configuration::empty().with_slot(
            SlotName::Db2,
            Some(SlotTriple::new("kufish").with_primary("v7")),
        );

        let expected = r#"# Generated by slot-panel. Do not edit.

server {
    listen 80;
    server_name db2.test.example.org;
    client_max_body_size 128M;

    location /static/ {
        root /volumes;
        rewrite ^/static/(.*)$ /db2-static-files/$1 break;
    }

    location / {
        resolver 127.0.0.11 valid=30s;
        set $backend "http://db2:8000";
        proxy_pass $backend;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
    }
}
"#;
        assert_eq!(render(&config, "test.example.org").unwrap(), expected);
    }

    #[test]
    fn test_empty_configuration_renders_header_only() {
        let out = render(&Configuration::empty(), "test.example.org").unwrap();
        assert_eq!(out, format!("{GENERATED_HEADER}\n"));
    }

    #[test]
    fn test_absent_slots_omitted_and_order_fixed() {
        let config = Configuration::empty()
            .with_slot(SlotName::Db5, Some(SlotTriple::new("b")))
            .with_slot(SlotName::Db1, Some(SlotTriple::new("a")));

        let out = render(&config, "panel.local").unwrap();
        assert_eq!(out.matches("server {").count(), 2);
        let db1 = out.find("server_name db1.panel.local;").unwrap();
        let db5 = out.find("server_name db5.panel.local;").unwrap();
        assert!(db1 < db5);
        assert!(!out.contains("db3."));
    }

    #[test]
    fn test_deterministic() {
        let config = Configuration::empty()
            .with_slot(SlotName::Db1, Some(SlotTriple::new("a").with_companion("c1")))
            .with_slot(SlotName::Db6, Some(SlotTriple::new("b")));

        let first = render(&config, "panel.local").unwrap();
        let second = render(&config, "panel.local").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_bad_host() {
        let config = Configuration::empty().with_slot(SlotName::Db1, Some(SlotTriple::new("a")));

        assert!(matches!(
            render(&config, "evil; include /etc/passwd"),
            Err(RenderError::InvalidHost(_))
        ));
        assert!(matches!(render(&config, ""), Err(RenderError::InvalidHost(_))));
    }

    #[test]
    fn test_rejects_unvalidated_triple() {
        let config = Configuration::empty().with_slot(SlotName::Db3, Some(SlotTriple::new("")));

        assert!(matches!(
            render(&config, "panel.local"),
            Err(RenderError::InvalidValue { slot: SlotName::Db3, .. })
        ));
    }
}
