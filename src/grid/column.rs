use serde::{Deserialize, Serialize};

/// Stable handle to a column in the grid's column arena.
///
/// The visible list, the id lookup and any plugin caches all hold keys, so a
/// change made through one of them is seen by the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey(pub(crate) usize);

/// Layout entry used to build a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,

    /// Header label, defaults to the id
    #[serde(default)]
    pub name: Option<String>,

    /// Row field this column reads, defaults to the id
    #[serde(default)]
    pub field: Option<String>,

    /// Fixed width in cells; `None` lets the width adapter decide
    #[serde(default)]
    pub width: Option<u16>,

    #[serde(default = "default_filterable")]
    pub filterable: bool,

    /// Field holding tree children, if this column shows the tree
    #[serde(default, rename = "expandField")]
    pub expand_field: Option<String>,
}

fn default_filterable() -> bool {
    true
}

impl ColumnDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            field: None,
            width: None,
            filterable: true,
            expand_field: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn expand_field(mut self, field: impl Into<String>) -> Self {
        self.expand_field = Some(field.into());
        self
    }
}

/// A grid column. Owned by the grid's arena and never copied by plugins.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub field: String,
    /// Position among the currently visible columns
    pub index: usize,
    pub hidden: bool,
    pub width: Option<u16>,
    /// Width last assigned by the width adapter
    pub render_width: u16,
    pub filterable: bool,
    pub expand_field: Option<String>,
}

impl Column {
    pub(crate) fn from_def(def: ColumnDef, index: usize) -> Self {
        let name = def.name.unwrap_or_else(|| def.id.clone());
        let field = def.field.unwrap_or_else(|| def.id.clone());
        Self {
            id: def.id,
            name,
            field,
            index,
            hidden: false,
            width: def.width,
            render_width: def.width.unwrap_or(0),
            filterable: def.filterable,
            expand_field: def.expand_field,
        }
    }
}

/// Anything that can name a column: an id string or a column itself.
pub trait AsColumnId {
    fn column_id(&self) -> &str;
}

impl AsColumnId for str {
    fn column_id(&self) -> &str {
        self
    }
}

impl AsColumnId for String {
    fn column_id(&self) -> &str {
        self.as_str()
    }
}

impl AsColumnId for Column {
    fn column_id(&self) -> &str {
        &self.id
    }
}

impl AsColumnId for ColumnDef {
    fn column_id(&self) -> &str {
        &self.id
    }
}

impl<T: AsColumnId + ?Sized> AsColumnId for &T {
    fn column_id(&self) -> &str {
        (**self).column_id()
    }
}
