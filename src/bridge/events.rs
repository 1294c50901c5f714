use serde::{Deserialize, Serialize};

/// Engine score as reported on an `info` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InfoPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashfull: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pv: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
}

impl InfoPayload {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One bridge-to-caller event, serialized as a compact tagged object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineEvent {
    Info(InfoPayload),
    Bestmove {
        #[serde(rename = "move")]
        mv: String,
    },
    Done,
    Error {
        message: String,
    },
}

/// Parse an `info ...` line into a payload. Unknown tokens are skipped;
/// `pv` and `string` consume the remainder of the line. Returns `None`
/// when nothing recognizable was present.
pub fn parse_info_line(line: &str) -> Option<InfoPayload> {
    let mut out = InfoPayload::default();
    let mut it = line.split_whitespace();
    while let Some(tok) = it.next() {
        match tok {
            "info" => {}
            "depth" => out.depth = it.next().and_then(|s| s.parse().ok()),
            "nodes" => out.nodes = it.next().and_then(|s| s.parse().ok()),
            "nps" => out.nps = it.next().and_then(|s| s.parse().ok()),
            "hashfull" => out.hashfull = it.next().and_then(|s| s.parse().ok()),
            "score" => {
                let kind = it.next().unwrap_or("");
                let val = it.next().and_then(|s| s.parse::<i32>().ok());
                out.score = match (kind, val) {
                    ("cp", Some(v)) => Some(Score::Cp(v)),
                    ("mate", Some(v)) => Some(Score::Mate(v)),
                    _ => None,
                };
            }
            "pv" => {
                out.pv = Some(it.map(str::to_string).collect());
                break;
            }
            "string" => {
                out.string = Some(it.collect::<Vec<_>>().join(" "));
                break;
            }
            _ => {}
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
