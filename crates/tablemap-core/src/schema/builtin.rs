//! Built-in delegates registered by every catalog.
use crate::{
    error::Error,
    schema::node::{CallbackContext, CallbackDecl, ColumnDecl, DelegateDecl, Operation},
};
use serde_json::Value as JsonValue;

/// Flattened creation/update stamps.
pub const AUDIT_DELEGATE: &str = "audit";

/// Optimistic-concurrency counter.
pub const VERSION_DELEGATE: &str = "version";

#[must_use]
pub fn audit() -> DelegateDecl {
    DelegateDecl::new(AUDIT_DELEGATE)
        .column(ColumnDecl::date("createdAt").internal())
        .column(ColumnDecl::string("createdBy").internal())
        .column(ColumnDecl::date("updatedAt").internal())
        .column(ColumnDecl::string("updatedBy").internal())
        .callback(CallbackDecl::new("audit.stamp", stamp_audit))
}

#[must_use]
pub fn version() -> DelegateDecl {
    DelegateDecl::new(VERSION_DELEGATE)
        .column(ColumnDecl::number("version").internal())
        .callback(CallbackDecl::new("version.bump", bump_version))
}

fn stamp_audit(ctx: &mut CallbackContext<'_>) -> Result<(), Error> {
    let now = ctx.session().now_rfc3339();
    let actor = ctx.session().actor.clone();

    match ctx.operation() {
        Operation::Insert => {
            ctx.set("createdAt", now.clone())?;
            if let Some(actor) = &actor {
                ctx.set("createdBy", actor.clone())?;
            }
        }
        Operation::Update => {}
        Operation::Delete => return Ok(()),
    }

    ctx.set("updatedAt", now)?;
    if let Some(actor) = actor {
        ctx.set("updatedBy", actor)?;
    }

    Ok(())
}

fn bump_version(ctx: &mut CallbackContext<'_>) -> Result<(), Error> {
    let current = ctx.get("version")?;

    match ctx.operation() {
        Operation::Insert => ctx.set("version", 1),
        Operation::Update => {
            let next = current.as_ref().and_then(JsonValue::as_u64).map_or(1, |v| v + 1);
            ctx.set("version", next)
        }
        Operation::Delete => {
            if current.is_some() {
                ctx.expect("version", current);
            }
            Ok(())
        }
    }
}
