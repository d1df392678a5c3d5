//! Part entity type - one line of a robot system's bill of materials

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label used by CAD exports for "no value in this column"
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One of the three ordered manufacturing stages a part may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    PreProcess,
    Process1,
    Process2,
}

impl StageKind {
    /// All stages in their fixed execution order
    pub const ALL: [StageKind; 3] = [StageKind::PreProcess, StageKind::Process1, StageKind::Process2];

    /// Human-readable column title
    pub fn title(self) -> &'static str {
        match self {
            StageKind::PreProcess => "Pre-Process",
            StageKind::Process1 => "Process 1",
            StageKind::Process2 => "Process 2",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::PreProcess => write!(f, "pre-process"),
            StageKind::Process1 => write!(f, "process1"),
            StageKind::Process2 => write!(f, "process2"),
        }
    }
}

/// A manufacturing stage label
///
/// Empty labels, missing labels and the CAD placeholder `"Unknown"` all
/// collapse to [`Stage::Undefined`] when parsed, so downstream code never has
/// to compare against sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    /// A real machine or process name (e.g. "Laser", "CNC")
    Defined(String),
    /// No stage is required
    #[default]
    Undefined,
}

impl Stage {
    /// Build a stage from a raw label, normalizing the "no stage" sentinels
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some("") | Some(UNKNOWN_LABEL) => Stage::Undefined,
            Some(l) => Stage::Defined(l.to_string()),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Stage::Defined(_))
    }

    pub fn is_undefined(&self) -> bool {
        !self.is_defined()
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Stage::Defined(l) => Some(l),
            Stage::Undefined => None,
        }
    }

    /// Case-insensitive comparison against a machine name
    pub fn matches_machine(&self, machine: &str) -> bool {
        self.label()
            .is_some_and(|l| l.to_lowercase() == machine.trim().to_lowercase())
    }
}

impl From<&str> for Stage {
    fn from(label: &str) -> Self {
        Stage::from_label(Some(label))
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stage::Defined(l) => serializer.serialize_some(l),
            Stage::Undefined => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Stage::from_label(raw.as_deref()))
    }
}

/// Required unit count as it appears in the BOM
///
/// CAD exports hand us numbers, numeric strings, or placeholders such as
/// `"N/A"`; the raw value is kept and parsed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    Count(i64),
    Text(String),
}

impl Quantity {
    /// Integer value, if the quantity parses as one
    pub fn units(&self) -> Option<i64> {
        match self {
            Quantity::Count(n) => Some(*n),
            Quantity::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.units().is_some()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Text(String::new())
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Quantity::Count(n)
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Quantity::Text(s.to_string())
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Count(n) => write!(f, "{}", n),
            Quantity::Text(s) if s.is_empty() => write!(f, "N/A"),
            Quantity::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quantity::Count(n) => serializer.serialize_i64(*n),
            Quantity::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawQuantity::deserialize(deserializer)? {
            RawQuantity::Missing => Quantity::default(),
            RawQuantity::Int(n) => Quantity::Count(n),
            RawQuantity::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                Quantity::Count(x as i64)
            }
            RawQuantity::Float(x) => Quantity::Text(x.to_string()),
            RawQuantity::Text(s) => Quantity::Text(s),
        })
    }
}

/// Derived manufacturing state, recomputed by the evaluator
///
/// Never read back from storage; a freshly deserialized part carries the
/// default state until it is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProcessState {
    /// Whether the part's quantity parsed as an integer
    pub quantity_valid: bool,

    pub pre_process_completed: bool,
    pub process1_completed: bool,
    pub process2_completed: bool,

    /// Label of the active stage; `None` once every stage is done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_process: Option<String>,

    /// Units outstanding at the active stage; the raw quantity when it
    /// could not be parsed
    pub remaining: Quantity,
}

impl ProcessState {
    pub fn completed(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::PreProcess => self.pre_process_completed,
            StageKind::Process1 => self.process1_completed,
            StageKind::Process2 => self.process2_completed,
        }
    }

    pub(crate) fn set_completed(&mut self, kind: StageKind, value: bool) {
        match kind {
            StageKind::PreProcess => self.pre_process_completed = value,
            StageKind::Process1 => self.process1_completed = value,
            StageKind::Process2 => self.process2_completed = value,
        }
    }

    pub fn all_completed(&self) -> bool {
        StageKind::ALL.iter().all(|k| self.completed(*k))
    }
}

/// Overall progress of a part, used for colour-coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartStatus::NotStarted => write!(f, "not-started"),
            PartStatus::InProgress => write!(f, "in-progress"),
            PartStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for PartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not-started" | "not_started" => Ok(PartStatus::NotStarted),
            "in-progress" | "in_progress" => Ok(PartStatus::InProgress),
            "completed" => Ok(PartStatus::Completed),
            _ => Err(format!(
                "Invalid part status: {}. Use not-started, in-progress, or completed",
                s
            )),
        }
    }
}

/// A part in a robot system's BOM
///
/// Field aliases accept the column names used by CAD exports and older
/// saved BOMs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part name, unique within a scope
    #[serde(alias = "Part Name")]
    pub name: String,

    /// Total units required
    #[serde(default, alias = "Quantity")]
    pub quantity: Quantity,

    #[serde(
        default,
        alias = "preProcess",
        alias = "Pre Process",
        skip_serializing_if = "Stage::is_undefined"
    )]
    pub pre_process: Stage,

    #[serde(
        default,
        alias = "Process1",
        alias = "Process 1",
        skip_serializing_if = "Stage::is_undefined"
    )]
    pub process1: Stage,

    #[serde(
        default,
        alias = "Process2",
        alias = "Process 2",
        skip_serializing_if = "Stage::is_undefined"
    )]
    pub process2: Stage,

    /// Units that have passed pre-processing
    #[serde(default, alias = "preProcessQuantity", alias = "preProcessQty")]
    pub pre_process_qty: u32,

    #[serde(default, alias = "process1Quantity", alias = "process1Qty")]
    pub process1_qty: u32,

    #[serde(default, alias = "process2Quantity", alias = "process2Qty")]
    pub process2_qty: u32,

    #[serde(default, alias = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "Material", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Material as listed on the BOM (may differ from the modelled material)
    #[serde(default, alias = "materialBOM", skip_serializing_if = "Option::is_none")]
    pub material_bom: Option<String>,

    /// CAD part identifier
    #[serde(default, alias = "partId", skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,

    /// Derived state (see `core::process`)
    #[serde(default, skip_deserializing)]
    pub state: ProcessState,
}

impl Part {
    /// Create a part with no stages and no progress
    pub fn new(name: impl Into<String>, quantity: impl Into<Quantity>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            pre_process: Stage::Undefined,
            process1: Stage::Undefined,
            process2: Stage::Undefined,
            pre_process_qty: 0,
            process1_qty: 0,
            process2_qty: 0,
            description: None,
            material: None,
            material_bom: None,
            part_id: None,
            state: ProcessState::default(),
        }
    }

    /// Builder: set a stage label
    pub fn with_stage(mut self, kind: StageKind, stage: impl Into<Stage>) -> Self {
        *self.stage_mut(kind) = stage.into();
        self
    }

    /// Builder: set a stage's progress count
    pub fn with_progress(mut self, kind: StageKind, qty: u32) -> Self {
        self.set_stage_qty(kind, qty);
        self
    }

    pub fn stage(&self, kind: StageKind) -> &Stage {
        match kind {
            StageKind::PreProcess => &self.pre_process,
            StageKind::Process1 => &self.process1,
            StageKind::Process2 => &self.process2,
        }
    }

    pub fn stage_mut(&mut self, kind: StageKind) -> &mut Stage {
        match kind {
            StageKind::PreProcess => &mut self.pre_process,
            StageKind::Process1 => &mut self.process1,
            StageKind::Process2 => &mut self.process2,
        }
    }

    pub fn stage_qty(&self, kind: StageKind) -> u32 {
        match kind {
            StageKind::PreProcess => self.pre_process_qty,
            StageKind::Process1 => self.process1_qty,
            StageKind::Process2 => self.process2_qty,
        }
    }

    pub fn set_stage_qty(&mut self, kind: StageKind, qty: u32) {
        match kind {
            StageKind::PreProcess => self.pre_process_qty = qty,
            StageKind::Process1 => self.process1_qty = qty,
            StageKind::Process2 => self.process2_qty = qty,
        }
    }

    /// Stages that carry a label, in execution order
    pub fn defined_stages(&self) -> impl Iterator<Item = (StageKind, &str)> {
        StageKind::ALL
            .into_iter()
            .filter_map(move |k| self.stage(k).label().map(|l| (k, l)))
    }
}

impl From<Option<&str>> for Stage {
    fn from(label: Option<&str>) -> Self {
        Stage::from_label(label)
    }
}
