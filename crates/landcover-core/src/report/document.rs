/// Layout-neutral printable report: sections of paragraphs and tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub subtitle: String,
    pub meta: Vec<String>,
    pub metrics: Vec<MetricTile>,
    pub sections: Vec<Section>,
}

/// A headline number in the strip under the header.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub value: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<Span>),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text(String),
    Strong(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Text(s) | Span::Strong(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    Data,
    Coverage,
    Impact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub style: TableStyle,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(style: TableStyle, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            style,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.rows.push(Row {
            cells: cells.into_iter().collect(),
        });
        self
    }

    /// Text of column `col` in every row.
    pub fn column(&self, col: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.cells.get(col).map(|c| c.text.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// Visual emphasis of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Negative,
    Positive,
    Forest,
    Barren,
    Urban,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub tone: Option<Tone>,
    pub strong: bool,
    pub colspan: u32,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
            strong: false,
            colspan: 1,
        }
    }

    pub fn strong(mut self) -> Self {
        self.strong = true;
        self
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn maybe_tone(mut self, tone: Option<Tone>) -> Self {
        self.tone = tone;
        self
    }

    pub fn span(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }
}

impl Document {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl Section {
    pub fn table(&self) -> Option<&Table> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Concatenated paragraph text.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(spans) => Some(spans.iter().map(Span::text).collect::<String>()),
                Block::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
