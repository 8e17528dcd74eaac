//! One-shot translation of the hierarchical legacy persistence layout into
//! relational rows.
//!
//! The legacy layout keeps one directory per node under `adapters/`:
//!
//! ```text
//! <data_dir>/adapters.json                              flat node registry
//! <data_dir>/adapters/<node>/adapter.json               per-node descriptor
//! <data_dir>/adapters/<node>/settings.json              opaque node settings
//! <data_dir>/adapters/<node>/subscriptions.json         consumed groups
//! <data_dir>/adapters/<node>/groups/<group>/config.json
//! <data_dir>/adapters/<node>/groups/<group>/datatags.json
//! ```
//!
//! Import order is fixed: nodes, settings, groups, tags, subscriptions. Each
//! step commits all its rows before the next begins, since later steps assume
//! earlier rows exist. Missing optional files contribute zero rows and are not
//! errors. The importer is not idempotent: it targets a pristine schema, and a
//! re-run duplicates rows.

use crate::core::db::MigrationStore;
use crate::core::error::MigrateError;
use rusqlite::{Connection, params};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct NodeRegistry {
    nodes: Vec<NodeRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    name: String,
    r#type: i64,
    state: i64,
    plugin_name: String,
}

#[derive(Debug, Deserialize)]
struct GroupConfig {
    read_interval: i64,
}

#[derive(Debug, Deserialize)]
struct TagFile {
    tags: Vec<TagRecord>,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    name: String,
    address: String,
    attribute: i64,
    r#type: i64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionFile {
    subscriptions: Vec<SubscriptionRecord>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionRecord {
    /// Name of the consuming app node.
    sub_adapter_name: String,
    /// Name of the producing driver node.
    src_adapter_name: String,
    group_config_name: String,
}

/// Run the full import pipeline against an already-migrated schema.
pub fn import_legacy(store: &MigrationStore, data_dir: &Path) -> Result<(), MigrateError> {
    let node_names = find_node_names(data_dir)?;
    let node_group_names = find_node_group_names(data_dir, &node_names)?;

    let conn = store.conn();
    import_nodes(conn, data_dir, &node_names)?;
    import_settings(conn, data_dir, &node_names)?;
    import_groups(conn, data_dir, &node_group_names)?;
    import_tags(conn, data_dir, &node_group_names)?;
    import_subscriptions(conn, data_dir, &node_names)?;
    Ok(())
}

fn adapters_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("adapters")
}

/// Node names are the subdirectories of `adapters/`. Sorted for a
/// deterministic import order.
fn find_node_names(data_dir: &Path) -> Result<Vec<String>, MigrateError> {
    let dir = adapters_dir(data_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// (node, group) pairs are the subdirectories of each node's `groups/`
/// directory.
fn find_node_group_names(
    data_dir: &Path,
    node_names: &[String],
) -> Result<Vec<(String, String)>, MigrateError> {
    let mut pairs = Vec::new();
    for node_name in node_names {
        let groups_dir = adapters_dir(data_dir).join(node_name).join("groups");
        if !groups_dir.exists() {
            continue;
        }
        let mut group_names = Vec::new();
        for entry in std::fs::read_dir(&groups_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                group_names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        group_names.sort();
        for group_name in group_names {
            pairs.push((node_name.clone(), group_name));
        }
    }
    Ok(pairs)
}

/// Import nodes from both legacy layouts, additively: the flat top-level
/// registry and the per-node descriptor files. Both may be present during a
/// layout transition; nothing deduplicates them.
fn import_nodes(
    conn: &Connection,
    data_dir: &Path,
    node_names: &[String],
) -> Result<(), MigrateError> {
    let registry_file = data_dir.join("adapters.json");
    if registry_file.exists() {
        let data = std::fs::read_to_string(&registry_file)?;
        let registry: NodeRegistry = serde_json::from_str(&data)?;
        for node in &registry.nodes {
            debug!("import node {}", node.name);
            insert_node(conn, node)?;
        }
    }

    for node_name in node_names {
        let descriptor_file = adapters_dir(data_dir).join(node_name).join("adapter.json");
        if !descriptor_file.exists() {
            continue;
        }
        let data = std::fs::read_to_string(&descriptor_file)?;
        let node: NodeRecord = serde_json::from_str(&data)?;
        debug!("import node {}", node.name);
        insert_node(conn, &node)?;
    }

    Ok(())
}

fn insert_node(conn: &Connection, node: &NodeRecord) -> Result<(), MigrateError> {
    conn.execute(
        "INSERT INTO nodes (name, type, state, plugin_name) VALUES (?1, ?2, ?3, ?4)",
        params![node.name, node.r#type, node.state, node.plugin_name],
    )?;
    Ok(())
}

/// Settings are stored verbatim: the text is the node's plugin configuration
/// and only the plugin that wrote it can interpret it.
fn import_settings(
    conn: &Connection,
    data_dir: &Path,
    node_names: &[String],
) -> Result<(), MigrateError> {
    for node_name in node_names {
        let settings_file = adapters_dir(data_dir).join(node_name).join("settings.json");
        if !settings_file.exists() {
            continue;
        }
        let setting = std::fs::read_to_string(&settings_file)?;
        debug!("import setting for node {}", node_name);
        conn.execute(
            "INSERT INTO settings (node_name, setting) VALUES (?1, ?2)",
            params![node_name, setting],
        )?;
    }
    Ok(())
}

fn import_groups(
    conn: &Connection,
    data_dir: &Path,
    node_group_names: &[(String, String)],
) -> Result<(), MigrateError> {
    for (node_name, group_name) in node_group_names {
        let config_file = adapters_dir(data_dir)
            .join(node_name)
            .join("groups")
            .join(group_name)
            .join("config.json");
        if !config_file.exists() {
            continue;
        }
        let data = std::fs::read_to_string(&config_file)?;
        let config: GroupConfig = serde_json::from_str(&data)?;
        debug!("import group {}/{}", node_name, group_name);
        conn.execute(
            "INSERT INTO groups (driver_name, name, interval) VALUES (?1, ?2, ?3)",
            params![node_name, group_name, config.read_interval],
        )?;
    }
    Ok(())
}

fn import_tags(
    conn: &Connection,
    data_dir: &Path,
    node_group_names: &[(String, String)],
) -> Result<(), MigrateError> {
    for (node_name, group_name) in node_group_names {
        let tags_file = adapters_dir(data_dir)
            .join(node_name)
            .join("groups")
            .join(group_name)
            .join("datatags.json");
        if !tags_file.exists() {
            continue;
        }
        let data = std::fs::read_to_string(&tags_file)?;
        let tag_file: TagFile = serde_json::from_str(&data)?;
        for tag in &tag_file.tags {
            debug!("import tag {}/{}/{}", node_name, group_name, tag.name);
            conn.execute(
                "INSERT INTO tags (driver_name, group_name, name, address,
                                   attribute, type, description)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    node_name,
                    group_name,
                    tag.name,
                    tag.address,
                    tag.attribute,
                    tag.r#type,
                    tag.description,
                ],
            )?;
        }
    }
    Ok(())
}

fn import_subscriptions(
    conn: &Connection,
    data_dir: &Path,
    node_names: &[String],
) -> Result<(), MigrateError> {
    for node_name in node_names {
        let subscriptions_file = adapters_dir(data_dir)
            .join(node_name)
            .join("subscriptions.json");
        if !subscriptions_file.exists() {
            continue;
        }
        let data = std::fs::read_to_string(&subscriptions_file)?;
        let sub_file: SubscriptionFile = serde_json::from_str(&data)?;
        for subscription in &sub_file.subscriptions {
            debug!(
                "import subscription {} -> {}/{}",
                subscription.sub_adapter_name,
                subscription.src_adapter_name,
                subscription.group_config_name
            );
            conn.execute(
                "INSERT INTO subscriptions (app_name, driver_name, group_name)
                                    VALUES (?1, ?2, ?3)",
                params![
                    subscription.sub_adapter_name,
                    subscription.src_adapter_name,
                    subscription.group_config_name,
                ],
            )?;
        }
    }
    Ok(())
}
