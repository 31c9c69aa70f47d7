//! Container-orchestration override (docker-compose).
//!
//! # Responsibilities
//! - One application service per configured slot
//! - One companion service per distinct companion tag
//! - Restart directive for the routing service via `RESTART_TOKEN`
//! - Named volume declarations for everything referenced above
//!
//! # Design Decisions
//! - Every scalar is double-quoted; `$` is doubled so compose does not interpolate
//! - Companion services are sorted by tag, slot services follow slot order

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::slots::error::RenderError;
use crate::slots::model::{Configuration, SlotName, SlotTriple};
use crate::slots::render::{check_triple, RenderContext, GENERATED_HEADER};

/// Environment variable carrying the per-render restart token.
pub const RESTART_TOKEN_VAR: &str = "RESTART_TOKEN";

/// Name of the routing service in the base compose file.
pub const ROUTING_SERVICE: &str = "nginx";

/// Render the compose override for `config`.
///
/// `restart_token` should be fresh for every render so the routing service is
/// recreated even when nothing else changed.
pub fn render_orchestration(
    config: &Configuration,
    ctx: &RenderContext<'_>,
    restart_token: Uuid,
) -> Result<String, RenderError> {
    for (slot, triple) in config.configured() {
        check_triple(slot, triple)?;
    }
    let companions = config.companion_tags();

    let mut sections = Vec::new();
    for (slot, triple) in config.configured() {
        sections.push(slot_service(slot, triple, ctx));
    }
    for tag in &companions {
        sections.push(companion_service(tag, ctx));
    }
    sections.push(routing_service(config, restart_token));

    let mut out = String::from(GENERATED_HEADER);
    out.push_str("\nservices:\n");
    out.push_str(&sections.join("\n"));

    let volumes = volume_names(config, &companions);
    if !volumes.is_empty() {
        out.push_str("\nvolumes:\n");
        for volume in volumes {
            out.push_str(&format!("  {volume}:\n"));
        }
    }
    Ok(out)
}

fn static_volume(slot: SlotName) -> String {
    format!("{slot}-static-files")
}

fn companion_name(tag: &str) -> String {
    format!("companion-{tag}")
}

fn slot_service(slot: SlotName, triple: &SlotTriple, ctx: &RenderContext<'_>) -> String {
    let image = format!("{}:{}", ctx.images.primary, triple.primary_or_default());
    let companion = companion_name(triple.companion_or_default());
    let env = [
        format!("DATABASE_NAME={}", triple.database),
        format!("DATABASE_HOST={}", ctx.database.host),
        format!("MASTER_NAME={}", ctx.database.user),
        format!("MASTER_PASSWORD={}", ctx.database.password),
    ];

    let mut out = format!(
        "  {slot}:\n    image: {}\n    restart: unless-stopped\n    volumes:\n      - {}\n      - {}\n    environment:\n",
        quoted(&image),
        quoted(&format!("{companion}:/opt/Specify:ro")),
        quoted(&format!("{}:/volumes/static-files", static_volume(slot))),
    );
    for var in &env {
        out.push_str(&format!("      - {}\n", quoted(var)));
    }
    out
}

fn companion_service(tag: &str, ctx: &RenderContext<'_>) -> String {
    let name = companion_name(tag);
    format!(
        "  {name}:\n    image: {}\n    volumes:\n      - {}\n",
        quoted(&format!("{}:{tag}", ctx.images.companion)),
        quoted(&format!("{name}:/volumes/Specify")),
    )
}

fn routing_service(config: &Configuration, restart_token: Uuid) -> String {
    let mut out = format!(
        "  {ROUTING_SERVICE}:\n    environment:\n      - {}\n",
        quoted(&format!("{RESTART_TOKEN_VAR}={restart_token}")),
    );
    let mounts: Vec<String> = config
        .configured()
        .map(|(slot, _)| {
            let volume = static_volume(slot);
            format!("      - {}\n", quoted(&format!("{volume}:/volumes/{volume}:ro")))
        })
        .collect();
    if !mounts.is_empty() {
        out.push_str("    volumes:\n");
        out.push_str(&mounts.concat());
    }
    out
}

fn volume_names(config: &Configuration, companions: &BTreeSet<&str>) -> Vec<String> {
    config
        .configured()
        .map(|(slot, _)| static_volume(slot))
        .chain(companions.iter().map(|tag| companion_name(tag)))
        .collect()
}

/// Double-quoted YAML scalar, with `$` escaped for compose interpolation.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("$$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DatabaseConfig, ImageConfig};

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            host: "mariadb".to_string(),
            user: "master".to_string(),
            password: "s3cret".to_string(),
        }
    }

    fn render(config: &Configuration, token: Uuid) -> String {
        let database = database();
        let images = ImageConfig::default();
        let ctx = RenderContext {
            host: "panel.local",
            database: &database,
            images: &images,
        };
        render_orchestration(config, &ctx, token).unwrap()
    }

    fn companion_services(out: &str) -> Vec<String> {
        let services = out.split("\nvolumes:\n").next().unwrap_or_default();
        services
            .lines()
            .filter(|line| line.starts_with("  companion-") && line.ends_with(':'))
            .map(|line| line.trim().trim_end_matches(':').to_string())
            .collect()
    }

    #[test]
    fn test_absent_slot_omitted() {
        let config = Configuration::empty().with_slot(
            SlotName::Db2,
            Some(SlotTriple::new("db1").with_primary("v1").with_companion("c1")),
        );

        let out = render(&config, Uuid::new_v4());
        assert!(out.contains("  db2:\n"));
        assert!(!out.contains("  db1:\n"));
        assert!(out.contains("image: \"specifyconsortium/specify7-service:v1\""));
        assert_eq!(companion_services(&out), vec!["companion-c1"]);
    }

    #[test]
    fn test_shared_companion_declared_once() {
        let config = Configuration::empty()
            .with_slot(SlotName::Db1, Some(SlotTriple::new("a").with_companion("c1")))
            .with_slot(SlotName::Db4, Some(SlotTriple::new("b").with_companion("c1")))
            .with_slot(SlotName::Db5, Some(SlotTriple::new("c").with_companion("c0")));

        let out = render(&config, Uuid::new_v4());
        assert_eq!(companion_services(&out), vec!["companion-c0", "companion-c1"]);
        assert_eq!(out.matches("specify6-service:c1\"").count(), 1);
        // Volume declared once as well.
        assert_eq!(out.matches("\n  companion-c1:\n").count(), 2);
    }

    #[test]
    fn test_only_restart_token_differs_between_renders() {
        let config = Configuration::empty()
            .with_slot(SlotName::Db1, Some(SlotTriple::new("a").with_companion("c1")))
            .with_slot(SlotName::Db3, Some(SlotTriple::new("b")));

        let first_token = Uuid::new_v4();
        let second_token = Uuid::new_v4();
        let first = render(&config, first_token);
        let second = render(&config, second_token);

        assert_ne!(first, second);
        assert!(first.contains(&format!("RESTART_TOKEN={first_token}")));
        assert_eq!(
            first.replace(&first_token.to_string(), "TOKEN"),
            second.replace(&second_token.to_string(), "TOKEN"),
        );
    }

    #[test]
    fn test_unset_tags_use_latest() {
        let config = Configuration::empty().with_slot(SlotName::Db6, Some(SlotTriple::new("a")));

        let out = render(&config, Uuid::nil());
        assert!(out.contains("image: \"specifyconsortium/specify7-service:latest\""));
        assert_eq!(companion_services(&out), vec!["companion-latest"]);
    }

    #[test]
    fn test_empty_configuration_still_restarts_routing() {
        let out = render(&Configuration::empty(), Uuid::nil());

        let expected = format!(
            "{GENERATED_HEADER}\nservices:\n  nginx:\n    environment:\n      - \"RESTART_TOKEN={}\"\n",
            Uuid::nil()
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_connection_parameters_embedded() {
        let config = Configuration::empty().with_slot(SlotName::Db1, Some(SlotTriple::new("kufish")));

        let out = render(&config, Uuid::nil());
        assert!(out.contains("- \"DATABASE_NAME=kufish\""));
        assert!(out.contains("- \"DATABASE_HOST=mariadb\""));
        assert!(out.contains("- \"MASTER_NAME=master\""));
        assert!(out.contains("- \"MASTER_PASSWORD=s3cret\""));
    }

    #[test]
    fn test_quoting_escapes_interpolation_and_quotes() {
        assert_eq!(quoted("pa$s\"w\\d"), "\"pa$$s\\\"w\\\\d\"");
        assert_eq!(quoted("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_full_output_for_one_slot() {
        let config = Configuration::empty().with_slot(
            SlotName::Db1,
            Some(SlotTriple::new("kufish").with_primary("v7").with_companion("6.8.03")),
        );

        let expected = format!(
            r#"{GENERATED_HEADER}
services:
  db1:
    image: "specifyconsortium/specify7-service:v7"
    restart: unless-stopped
    volumes:
      - "companion-6.8.03:/opt/Specify:ro"
      - "db1-static-files:/volumes/static-files"
    environment:
      - "DATABASE_NAME=kufish"
      - "DATABASE_HOST=mariadb"
      - "MASTER_NAME=master"
      - "MASTER_PASSWORD=s3cret"

  companion-6.8.03:
    image: "specifyconsortium/specify6-service:6.8.03"
    volumes:
      - "companion-6.8.03:/volumes/Specify"

  nginx:
    environment:
      - "RESTART_TOKEN={}"
    volumes:
      - "db1-static-files:/volumes/db1-static-files:ro"

volumes:
  db1-static-files:
  companion-6.8.03:
"#,
            Uuid::nil()
        );
        assert_eq!(render(&config, Uuid::nil()), expected);
    }
}
