use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::table::Table;

/// The fixed set of chart kinds the UI can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Pie,
    Sunburst,
}

impl ChartKind {
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Sunburst => "sunburst",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Column names assigned to chart roles. Every role is explicitly optional;
/// which ones are required depends on the chart kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleMap {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub facet: Option<String>,
    pub values: Option<String>,
    pub names: Option<String>,
    pub path: Vec<String>,
}

/// A declarative chart description: kind, role mapping, and the data it draws
/// from. Carries no rendering state; the UI host hands it to a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub roles: RoleMap,
    pub data: Table,
}

impl ChartSpec {
    /// JSON form for hand-off to a renderer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Validate a role mapping against the table and produce a ChartSpec.
///
/// Required roles: x and y for line/bar/scatter; values and names for pie;
/// a non-empty path plus values for sunburst. Optional roles are validated
/// only where the kind uses them (color on line/bar/scatter, size on
/// scatter, facet on bar).
pub fn build_chart(table: &Table, kind: ChartKind, roles: RoleMap) -> Result<ChartSpec> {
    let mut referenced: Vec<String> = Vec::new();

    match kind {
        ChartKind::Line | ChartKind::Bar | ChartKind::Scatter => {
            referenced.push(required(kind, &roles.x, "x")?);
            referenced.push(required(kind, &roles.y, "y")?);
            if let Some(color) = &roles.color {
                referenced.push(color.clone());
            }
            if kind == ChartKind::Scatter {
                if let Some(size) = &roles.size {
                    referenced.push(size.clone());
                }
            }
            if kind == ChartKind::Bar {
                if let Some(facet) = &roles.facet {
                    referenced.push(facet.clone());
                }
            }
        }
        ChartKind::Pie => {
            referenced.push(required(kind, &roles.values, "values")?);
            referenced.push(required(kind, &roles.names, "names")?);
        }
        ChartKind::Sunburst => {
            if roles.path.is_empty() {
                return Err(Error::MissingRole {
                    kind: kind.name(),
                    role: "path",
                });
            }
            referenced.extend(roles.path.iter().cloned());
            referenced.push(required(kind, &roles.values, "values")?);
        }
    }

    for name in &referenced {
        if table.column(name).is_none() {
            return Err(Error::ColumnNotFound(name.clone()));
        }
    }

    Ok(ChartSpec {
        kind,
        roles,
        data: table.clone(),
    })
}

fn required(kind: ChartKind, slot: &Option<String>, role: &'static str) -> Result<String> {
    slot.clone().ok_or(Error::MissingRole {
        kind: kind.name(),
        role,
    })
}
