use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::PromotionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Primary,
    JuniorSecondary,
    SeniorSecondary,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::JuniorSecondary => "junior_secondary",
            Category::SeniorSecondary => "senior_secondary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(Category::Primary),
            "junior_secondary" => Some(Category::JuniorSecondary),
            "senior_secondary" => Some(Category::SeniorSecondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNode {
    pub name: String,
    pub category: Category,
    pub rank: i64,
    pub next_class: Option<String>,
    pub is_terminal: bool,
}

/// In-memory view of the tenant's class ladder, loaded once per request.
pub struct ClassHierarchy {
    nodes: Vec<ClassNode>,
    by_name: HashMap<String, usize>,
}

impl ClassHierarchy {
    pub fn from_nodes(nodes: Vec<ClassNode>) -> Self {
        let by_name = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        Self { nodes, by_name }
    }

    pub fn load(conn: &Connection) -> Result<Self, PromotionError> {
        let mut stmt = conn
            .prepare(
                "SELECT name, category, rank, next_class, is_terminal
                 FROM class_nodes
                 ORDER BY category, rank",
            )
            .map_err(|e| PromotionError::new("db_query_failed", e.to_string()))?;

        let nodes = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let category: String = row.get(1)?;
                let rank: i64 = row.get(2)?;
                let next_class: Option<String> = row.get(3)?;
                let is_terminal: i64 = row.get(4)?;
                Ok((name, category, rank, next_class, is_terminal != 0))
            })
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(|e| PromotionError::new("db_query_failed", e.to_string()))?;

        let mut out = Vec::with_capacity(nodes.len());
        for (name, category, rank, next_class, is_terminal) in nodes {
            let category = Category::parse(&category).ok_or_else(|| {
                PromotionError::new(
                    "db_query_failed",
                    format!("class {} has unknown category {}", name, category),
                )
            })?;
            out.push(ClassNode {
                name,
                category,
                rank,
                next_class,
                is_terminal,
            });
        }

        Ok(Self::from_nodes(out))
    }

    pub fn nodes(&self) -> &[ClassNode] {
        &self.nodes
    }

    pub fn get(&self, class_name: &str) -> Result<&ClassNode, PromotionError> {
        self.by_name
            .get(class_name)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| {
                PromotionError::new(
                    "unknown_class",
                    format!("class {} is not in the hierarchy", class_name),
                )
            })
    }

    /// None means the class is terminal. An unknown name is an error, never None.
    pub fn successor_of(&self, class_name: &str) -> Result<Option<&ClassNode>, PromotionError> {
        let node = self.get(class_name)?;
        match node.next_class.as_deref() {
            None => Ok(None),
            Some(next) => self.get(next).map(Some),
        }
    }

    pub fn is_terminal(&self, class_name: &str) -> Result<bool, PromotionError> {
        Ok(self.get(class_name)?.is_terminal)
    }

    pub fn nodes_by_category(&self, category: Category) -> Vec<&ClassNode> {
        let mut out: Vec<&ClassNode> = self
            .nodes
            .iter()
            .filter(|n| n.category == category)
            .collect();
        out.sort_by_key(|n| n.rank);
        out
    }
}

/// Structural checks for a replacement node set:
/// terminal nodes and only terminal nodes lack a successor, every successor
/// exists, and (category, rank) pairs do not collide.
pub fn validate_nodes(nodes: &[ClassNode]) -> Result<(), PromotionError> {
    if nodes.is_empty() {
        return Err(PromotionError::new(
            "bad_params",
            "hierarchy must contain at least one class",
        ));
    }

    let mut names: HashSet<&str> = HashSet::new();
    let mut slots: HashSet<(Category, i64)> = HashSet::new();
    for n in nodes {
        if n.name.trim().is_empty() {
            return Err(PromotionError::new("bad_params", "class name must not be empty"));
        }
        if !names.insert(n.name.as_str()) {
            return Err(PromotionError::new(
                "bad_params",
                format!("duplicate class name {}", n.name),
            ));
        }
        if !slots.insert((n.category, n.rank)) {
            return Err(PromotionError::new(
                "bad_params",
                format!("duplicate rank {} in category {}", n.rank, n.category.as_str()),
            ));
        }
    }

    for n in nodes {
        match (&n.next_class, n.is_terminal) {
            (Some(_), true) => {
                return Err(PromotionError::new(
                    "bad_params",
                    format!("terminal class {} must not have a successor", n.name),
                )
                .with_details(json!({ "class": n.name.clone() })));
            }
            (None, false) => {
                return Err(PromotionError::new(
                    "bad_params",
                    format!("non-terminal class {} must have a successor", n.name),
                )
                .with_details(json!({ "class": n.name.clone() })));
            }
            (Some(next), false) => {
                if !names.contains(next.as_str()) {
                    return Err(PromotionError::new(
                        "bad_params",
                        format!("class {} points at unknown successor {}", n.name, next),
                    )
                    .with_details(json!({ "class": n.name.clone(), "successor": next })));
                }
            }
            (None, true) => {}
        }
    }

    Ok(())
}
