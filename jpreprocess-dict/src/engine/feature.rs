//! Feature records produced by the frontend.

use serde::{Deserialize, Serialize};

/// Part of speech of symbol records (punctuation, brackets and the like).
pub(crate) const POS_SYMBOL: &str = "記号";

/// Fields in an NJD line.
const NJD_FIELDS: usize = 13;

/// One morpheme after frontend processing.
///
/// String fields use `*` for "not applicable", matching the dictionary's own
/// notation. `chain_flag` is `-1` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NjdFeature {
    pub string: String,
    pub pos: String,
    pub pos_group1: String,
    pub pos_group2: String,
    pub pos_group3: String,
    pub ctype: String,
    pub cform: String,
    pub orig: String,
    pub read: String,
    pub pron: String,
    pub acc: i32,
    pub mora_size: i32,
    pub chain_rule: String,
    pub chain_flag: i32,
}

impl NjdFeature {
    pub fn is_symbol(&self) -> bool {
        self.pos == POS_SYMBOL
    }

    /// Kana reading used by `g2p`: the pronunciation, or the surface string
    /// for symbols, with accent marks (`’`) removed.
    pub fn kana(&self) -> String {
        let source = if self.is_symbol() {
            &self.string
        } else {
            &self.pron
        };
        source.replace('’', "")
    }

    /// Parse one NJD line as printed by the engine:
    ///
    /// `string,pos,group1,group2,group3,ctype,cform,orig,read,pron,acc/mora,chain_rule,chain_flag`
    pub fn from_njd_line(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != NJD_FIELDS {
            return Err(format!(
                "expected {} fields in NJD line, found {}: {}",
                NJD_FIELDS,
                fields.len(),
                line
            ));
        }

        let (acc, mora_size) = fields[10]
            .split_once('/')
            .and_then(|(acc, mora)| Some((acc.parse().ok()?, mora.parse().ok()?)))
            .ok_or_else(|| format!("invalid accent/mora field '{}' in NJD line", fields[10]))?;
        let owned = |i: usize| fields[i].to_string();

        Ok(Self {
            string: owned(0),
            pos: owned(1),
            pos_group1: owned(2),
            pos_group2: owned(3),
            pos_group3: owned(4),
            ctype: owned(5),
            cform: owned(6),
            orig: owned(7),
            read: owned(8),
            pron: owned(9),
            acc,
            mora_size,
            chain_rule: owned(11),
            chain_flag: fields[12].parse().unwrap_or(-1),
        })
    }

    /// The inverse of [`from_njd_line`](Self::from_njd_line).
    pub fn to_njd_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{}/{},{},{}",
            self.string,
            self.pos,
            self.pos_group1,
            self.pos_group2,
            self.pos_group3,
            self.ctype,
            self.cform,
            self.orig,
            self.read,
            self.pron,
            self.acc,
            self.mora_size,
            self.chain_rule,
            self.chain_flag
        )
    }
}

impl Default for NjdFeature {
    fn default() -> Self {
        let star = || "*".to_string();
        Self {
            string: String::new(),
            pos: star(),
            pos_group1: star(),
            pos_group2: star(),
            pos_group3: star(),
            ctype: star(),
            cform: star(),
            orig: star(),
            read: star(),
            pron: star(),
            acc: 0,
            mora_size: 0,
            chain_rule: star(),
            chain_flag: -1,
        }
    }
}
