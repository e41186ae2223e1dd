use std::sync::Arc;

/// Column titles in the order the inventory table shows them.
pub const COLUMN_HEADERS: [&str; 4] = ["Id Number", "Instrument Name", "Size", "Quality"];

/// One instrument entry. All fields are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub size: String,
    pub quality: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: size.into(),
            quality: quality.into(),
        }
    }

    /// Fields in column order, matching `COLUMN_HEADERS`.
    pub fn fields(&self) -> [&str; 4] {
        [&self.id, &self.name, &self.size, &self.quality]
    }

    /// Fields a search looks at. The id is not searchable.
    pub fn searchable_fields(&self) -> [&str; 3] {
        [&self.name, &self.size, &self.quality]
    }

    /// Single csv line, quoting cells that contain spaces, tabs, commas or quotes.
    pub fn to_csv_line(&self) -> String {
        self.fields()
            .iter()
            .map(|c| wrap_cell_content(c))
            .collect::<Vec<String>>()
            .join(",")
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = needs_escaping || c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// Ordered, immutable sequence of records.
///
/// Cloning is cheap: clones share the same storage. A dataset is never
/// changed after construction; filtering produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Arc<Vec<Record>>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}
