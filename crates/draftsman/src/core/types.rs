//! Core type definitions for diagram processing
//!
//! This module contains the fundamental types used throughout Draftsman:
//! layout direction, curve style, output formats, edge directions and the
//! catalog of node kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::text::kebab_case;
use super::DiagramError;

/// Character set for the terminal preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CharacterSet {
    /// Pure ASCII characters only: + - | < > ^ v
    Ascii,
    /// Unicode box-drawing characters: ┌ ┐ └ ┘ ─ │ ▲ ▼
    #[default]
    Unicode,
}

impl CharacterSet {
    /// Returns true if this character set uses only ASCII
    pub fn is_ascii(&self) -> bool {
        matches!(self, CharacterSet::Ascii)
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterSet::Ascii => write!(f, "ascii"),
            CharacterSet::Unicode => write!(f, "unicode"),
        }
    }
}

/// Flow direction of a diagram or cluster (Graphviz `rankdir`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Top to bottom (TB, also accepts TD)
    TopBottom,
    /// Bottom to top (BT)
    BottomTop,
    /// Left to right (LR)
    #[default]
    LeftRight,
    /// Right to left (RL)
    RightLeft,
}

impl Direction {
    /// Graphviz `rankdir` value
    pub fn as_rankdir(&self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }

    /// Returns true if this is a vertical layout (TB or BT)
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::TopBottom | Direction::BottomTop)
    }

    /// Returns true if this is a horizontal layout (LR or RL)
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }

    /// Returns true if the flow is reversed (RL or BT)
    pub fn is_reversed(&self) -> bool {
        matches!(self, Direction::RightLeft | Direction::BottomTop)
    }
}

impl FromStr for Direction {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TB" | "TD" => Ok(Direction::TopBottom),
            "BT" => Ok(Direction::BottomTop),
            "LR" => Ok(Direction::LeftRight),
            "RL" => Ok(Direction::RightLeft),
            _ => Err(DiagramError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_rankdir().to_string()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_rankdir())
    }
}

/// Edge curve style (Graphviz `splines`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurveStyle {
    /// Right-angled edges
    #[default]
    Ortho,
    /// Curved edges
    Curved,
}

impl CurveStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveStyle::Ortho => "ortho",
            CurveStyle::Curved => "curved",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ortho" => Ok(CurveStyle::Ortho),
            "curved" => Ok(CurveStyle::Curved),
            _ => Err(DiagramError::InvalidCurveStyle {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CurveStyle {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurveStyle> for String {
    fn from(value: CurveStyle) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CurveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output formats understood by the Graphviz backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    /// Graphviz source only, no rasterization
    Dot,
}

impl OutputFormat {
    /// All supported formats
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Png,
        OutputFormat::Jpg,
        OutputFormat::Svg,
        OutputFormat::Pdf,
        OutputFormat::Dot,
    ];

    /// File extension (also the `dot -T` argument)
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Dot => "dot",
        }
    }

    /// Returns true if the output is not printable text
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpg | OutputFormat::Pdf)
    }
}

impl FromStr for OutputFormat {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "dot" | "gv" => Ok(OutputFormat::Dot),
            _ => Err(DiagramError::InvalidOutputFormat {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(value: OutputFormat) -> Self {
        value.extension().to_string()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Arrowhead placement of an edge (Graphviz `dir`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// No arrowheads
    None,
    /// Arrowhead at the target
    #[default]
    Forward,
    /// Arrowhead at the source
    Back,
    /// Arrowheads at both ends
    Both,
}

impl EdgeDirection {
    /// Combine the forward/reverse flags collected while chaining
    pub fn from_flags(forward: bool, reverse: bool) -> Self {
        match (forward, reverse) {
            (true, true) => EdgeDirection::Both,
            (true, false) => EdgeDirection::Forward,
            (false, true) => EdgeDirection::Back,
            (false, false) => EdgeDirection::None,
        }
    }

    /// Graphviz `dir` value
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDirection::None => "none",
            EdgeDirection::Forward => "forward",
            EdgeDirection::Back => "back",
            EdgeDirection::Both => "both",
        }
    }

    /// Arrowhead drawn at the target end
    pub fn head(&self) -> bool {
        matches!(self, EdgeDirection::Forward | EdgeDirection::Both)
    }

    /// Arrowhead drawn at the source end
    pub fn tail(&self) -> bool {
        matches!(self, EdgeDirection::Back | EdgeDirection::Both)
    }
}

impl FromStr for EdgeDirection {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(EdgeDirection::None),
            "forward" => Ok(EdgeDirection::Forward),
            "back" => Ok(EdgeDirection::Back),
            "both" => Ok(EdgeDirection::Both),
            _ => Err(DiagramError::ValidationError {
                message: format!("'{}' is not a valid edge direction", s),
            }),
        }
    }
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node kinds with their icon location in the provider catalog
///
/// The provider/category/class triple matches the icon tree layout
/// (`onprem/client/user.png`). `Generic` nodes carry no icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeKind {
    #[default]
    Generic,
    // onprem.client
    Client,
    User,
    Users,
    // generic.storage
    Storage,
    // programming.flowchart
    Action,
    Collate,
    Database,
    Decision,
    Delay,
    Display,
    Document,
    InputOutput,
    Inspection,
    InternalStorage,
    LoopLimit,
    ManualInput,
    ManualLoop,
    Merge,
    MultipleDocuments,
    OffPageConnectorLeft,
    OffPageConnectorRight,
    Or,
    PredefinedProcess,
    Preparation,
    Sort,
    StartEnd,
    StoredData,
    SummingJunction,
}

impl NodeKind {
    /// Every kind in catalog order
    pub const ALL: [NodeKind; 29] = [
        NodeKind::Generic,
        NodeKind::Client,
        NodeKind::User,
        NodeKind::Users,
        NodeKind::Storage,
        NodeKind::Action,
        NodeKind::Collate,
        NodeKind::Database,
        NodeKind::Decision,
        NodeKind::Delay,
        NodeKind::Display,
        NodeKind::Document,
        NodeKind::InputOutput,
        NodeKind::Inspection,
        NodeKind::InternalStorage,
        NodeKind::LoopLimit,
        NodeKind::ManualInput,
        NodeKind::ManualLoop,
        NodeKind::Merge,
        NodeKind::MultipleDocuments,
        NodeKind::OffPageConnectorLeft,
        NodeKind::OffPageConnectorRight,
        NodeKind::Or,
        NodeKind::PredefinedProcess,
        NodeKind::Preparation,
        NodeKind::Sort,
        NodeKind::StartEnd,
        NodeKind::StoredData,
        NodeKind::SummingJunction,
    ];

    /// Icon provider (`onprem`, `generic`, `programming`)
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            NodeKind::Generic => None,
            NodeKind::Client | NodeKind::User | NodeKind::Users => Some("onprem"),
            NodeKind::Storage => Some("generic"),
            _ => Some("programming"),
        }
    }

    /// Category within the provider
    pub fn category(&self) -> Option<&'static str> {
        match self {
            NodeKind::Generic => None,
            NodeKind::Client | NodeKind::User | NodeKind::Users => Some("client"),
            NodeKind::Storage => Some("storage"),
            _ => Some("flowchart"),
        }
    }

    /// Class name as written in diagram sources
    pub fn class_name(&self) -> &'static str {
        match self {
            NodeKind::Generic => "Node",
            NodeKind::Client => "Client",
            NodeKind::User => "User",
            NodeKind::Users => "Users",
            NodeKind::Storage => "Storage",
            NodeKind::Action => "Action",
            NodeKind::Collate => "Collate",
            NodeKind::Database => "Database",
            NodeKind::Decision => "Decision",
            NodeKind::Delay => "Delay",
            NodeKind::Display => "Display",
            NodeKind::Document => "Document",
            NodeKind::InputOutput => "InputOutput",
            NodeKind::Inspection => "Inspection",
            NodeKind::InternalStorage => "InternalStorage",
            NodeKind::LoopLimit => "LoopLimit",
            NodeKind::ManualInput => "ManualInput",
            NodeKind::ManualLoop => "ManualLoop",
            NodeKind::Merge => "Merge",
            NodeKind::MultipleDocuments => "MultipleDocuments",
            NodeKind::OffPageConnectorLeft => "OffPageConnectorLeft",
            NodeKind::OffPageConnectorRight => "OffPageConnectorRight",
            NodeKind::Or => "Or",
            NodeKind::PredefinedProcess => "PredefinedProcess",
            NodeKind::Preparation => "Preparation",
            NodeKind::Sort => "Sort",
            NodeKind::StartEnd => "StartEnd",
            NodeKind::StoredData => "StoredData",
            NodeKind::SummingJunction => "SummingJunction",
        }
    }

    /// Fully-qualified name, e.g. `onprem.client.User`
    pub fn qualified_name(&self) -> String {
        match (self.provider(), self.category()) {
            (Some(provider), Some(category)) => {
                format!("{}.{}.{}", provider, category, self.class_name())
            }
            _ => self.class_name().to_string(),
        }
    }

    /// Icon path relative to an icon root, e.g. `programming/flowchart/multiple-documents.png`
    pub fn icon_path(&self) -> Option<String> {
        let provider = self.provider()?;
        let category = self.category()?;
        Some(format!(
            "{}/{}/{}.png",
            provider,
            category,
            kebab_case(self.class_name())
        ))
    }

    /// Graphviz shape used when no icon is available
    pub fn fallback_shape(&self) -> &'static str {
        match self {
            NodeKind::Generic | NodeKind::Action | NodeKind::InternalStorage => "box",
            NodeKind::Client => "box3d",
            NodeKind::User | NodeKind::Users => "ellipse",
            NodeKind::Storage => "folder",
            NodeKind::Collate | NodeKind::Merge => "invtriangle",
            NodeKind::Database | NodeKind::StoredData => "cylinder",
            NodeKind::Decision | NodeKind::Sort => "diamond",
            NodeKind::Delay | NodeKind::StartEnd => "oval",
            NodeKind::Display => "septagon",
            NodeKind::Document | NodeKind::MultipleDocuments => "note",
            NodeKind::InputOutput => "parallelogram",
            NodeKind::Inspection | NodeKind::Or | NodeKind::SummingJunction => "circle",
            NodeKind::LoopLimit => "house",
            NodeKind::ManualInput => "trapezium",
            NodeKind::ManualLoop => "invtrapezium",
            NodeKind::OffPageConnectorLeft | NodeKind::OffPageConnectorRight => "pentagon",
            NodeKind::PredefinedProcess => "component",
            NodeKind::Preparation => "hexagon",
        }
    }

    /// Returns true if the kind has an icon in the provider catalog
    pub fn has_icon(&self) -> bool {
        !matches!(self, NodeKind::Generic)
    }
}

impl FromStr for NodeKind {
    type Err = DiagramError;

    /// Resolve a kind from `provider.category.Class` or a bare class name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.qualified_name() == name || kind.class_name() == name)
            .ok_or_else(|| DiagramError::UnknownNodeKind {
                kind: name.to_string(),
            })
    }
}

impl TryFrom<String> for NodeKind {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeKind> for String {
    fn from(value: NodeKind) -> Self {
        value.qualified_name()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
