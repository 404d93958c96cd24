//! antiSMASH record adapter
//!
//! Reads the JSON documents antiSMASH writes (`{"records": [{"id", "features": [...]}]}`)
//! and turns a record, or one region of it, into [`TrackViewerData`]. Each feature type
//! becomes a track; coding sequences are drawn as arrows and domains as boxes, with PFAM
//! domains filled from an accession color map.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::types::{Annotation, AnnotationType, Direction, DrawingPrimitive, Track, TrackViewerData};

const LOCATION_PATTERN: &str = r"\[<?(\d+):>?(\d+)\](?:\(([+-])\))?";

/// Feature types drawn as directional arrows
const GENE_TYPES: [&str; 2] = ["CDS", "gene"];
/// Qualifiers tried in order for a feature's label
const LABEL_QUALIFIERS: [&str; 6] = ["gene", "locus_tag", "protein_id", "domain", "aSDomain", "product"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AntismashDocument {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl AntismashDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a record by id, or take the first one.
    pub fn record(&self, id: Option<&str>) -> Result<&Record> {
        match id {
            Some(id) => self
                .records
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| ViewerError::record(format!("record {} not found", id))),
            None => self.records.first().ok_or_else(|| ViewerError::record("document has no records")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub qualifiers: BTreeMap<String, serde_json::Value>,
}

impl Feature {
    /// All values of a qualifier. antiSMASH stores them as string lists.
    pub fn qualifier_values(&self, name: &str) -> Vec<String> {
        match self.qualifiers.get(name) {
            Some(serde_json::Value::Array(items)) => items.iter().map(value_to_string).collect(),
            Some(value) => vec![value_to_string(value)],
            None => Vec::new(),
        }
    }

    pub fn qualifier(&self, name: &str) -> Option<String> {
        self.qualifier_values(name).into_iter().next()
    }

    pub fn location(&self) -> Option<Location> {
        match_location(&self.location)
    }

    fn label(&self) -> String {
        LABEL_QUALIFIERS
            .iter()
            .find_map(|q| self.qualifier(q))
            .unwrap_or_default()
    }
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: u64,
    pub end: u64,
    pub strand: Option<Strand>,
}

impl Location {
    pub fn overlaps(&self, other: &Location) -> bool {
        !(self.end < other.start || self.start > other.end)
    }
}

fn location_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LOCATION_PATTERN).ok()).as_ref()
}

/// Parse an antiSMASH location such as `[<12:>345](+)`.
///
/// Compound locations (`join{[1:10](+), [20:30](+)}`) are reduced to their outer bounds
/// with the strand of the first part. Fuzzy markers are ignored.
pub fn match_location(location: &str) -> Option<Location> {
    let re = location_regex()?;
    let mut result: Option<Location> = None;
    for caps in re.captures_iter(location) {
        let start: u64 = caps.get(1)?.as_str().parse().ok()?;
        let end: u64 = caps.get(2)?.as_str().parse().ok()?;
        let strand = caps.get(3).map(|m| if m.as_str() == "-" { Strand::Reverse } else { Strand::Forward });
        result = Some(match result {
            None => Location { start, end, strand },
            Some(prev) => Location { start: prev.start.min(start), end: prev.end.max(end), strand: prev.strand },
        });
    }
    result
}

/// Summary of a `region` feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: String,
    pub region_number: String,
    pub location: String,
    pub start: u64,
    pub end: u64,
    pub product: Vec<String>,
    pub rules: Vec<String>,
}

impl Record {
    /// Regions of this record, sorted by start.
    pub fn regions(&self) -> Vec<RegionInfo> {
        let mut regions: Vec<RegionInfo> = self
            .features
            .iter()
            .filter(|f| f.kind == "region")
            .map(|f| {
                let number = f.qualifier("region_number").unwrap_or_else(|| "unknown".to_string());
                let (start, end) = f.location().map(|l| (l.start, l.end)).unwrap_or((0, 0));
                let product = f.qualifier_values("product");
                RegionInfo {
                    id: format!("region_{}", number),
                    region_number: number,
                    location: f.location.clone(),
                    start,
                    end,
                    product: if product.is_empty() { vec!["unknown".to_string()] } else { product },
                    rules: f.qualifier_values("rules"),
                }
            })
            .collect();
        regions.sort_by_key(|r| r.start);
        regions
    }

    pub fn region(&self, region_id: &str) -> Result<RegionInfo> {
        let region = self
            .regions()
            .into_iter()
            .find(|r| r.id == region_id)
            .ok_or_else(|| ViewerError::record(format!("region {} not found in record {}", region_id, self.id)))?;
        if match_location(&region.location).is_none() {
            return Err(ViewerError::record(format!("invalid region location {:?}", region.location)));
        }
        Ok(region)
    }

    /// Features overlapping a region, partial overlaps included. The region feature
    /// itself and features without a parseable location are skipped.
    pub fn region_features(&self, region_id: &str) -> Result<Vec<&Feature>> {
        let region = self.region(region_id)?;
        let bounds = Location { start: region.start, end: region.end, strand: None };
        Ok(self
            .features
            .iter()
            .filter(|f| f.kind != "region")
            .filter(|f| f.location().map_or(false, |l| l.overlaps(&bounds)))
            .collect())
    }

    /// Highest end coordinate of any feature.
    pub fn extent(&self) -> u64 {
        self.features.iter().filter_map(Feature::location).map(|l| l.end).max().unwrap_or(0)
    }
}

/// PFAM accession (without version) to fill color.
pub type PfamColorMap = HashMap<String, String>;

pub fn parse_pfam_colors(json: &str) -> Result<PfamColorMap> {
    Ok(serde_json::from_str(json)?)
}

fn pfam_accession(feature: &Feature) -> Option<String> {
    feature
        .qualifier_values("db_xref")
        .into_iter()
        .chain(feature.qualifier("accession"))
        .find(|x| x.starts_with("PF"))
        .map(|x| x.split('.').next().unwrap_or_default().to_string())
}

/// Viewer data for a record plus the domain it should be shown on.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRecord {
    pub data: TrackViewerData,
    pub domain: [f64; 2],
}

/// Convert a record, optionally restricted to one region, into viewer data.
pub fn record_to_track_data(
    record: &Record,
    region_id: Option<&str>,
    pfam_colors: &PfamColorMap,
) -> Result<ConvertedRecord> {
    let (features, domain): (Vec<&Feature>, [f64; 2]) = match region_id {
        Some(id) => {
            let region = record.region(id)?;
            (record.region_features(id)?, [region.start as f64, region.end as f64])
        }
        None => (record.features.iter().collect(), [0.0, record.extent().max(1) as f64]),
    };

    let mut data = TrackViewerData::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut skipped = 0usize;

    for feature in features {
        let Some(location) = feature.location() else {
            skipped += 1;
            continue;
        };
        let kind = feature.kind.as_str();
        if !data.has_track(kind) {
            data.tracks.push(Track::new(kind, kind));
            data.primitives.push(DrawingPrimitive::horizontal_line(format!("{}-baseline", kind), kind));
        }
        let n = counters.entry(kind).or_insert(0);
        *n += 1;

        let is_gene = GENE_TYPES.contains(&kind);
        let shape = if is_gene { AnnotationType::Arrow } else { AnnotationType::Box };
        let label = feature.label();
        let mut annotation = Annotation::new(
            format!("{}-{}", kind, n),
            kind,
            shape,
            location.start as f64,
            location.end as f64,
        );
        annotation.classes = vec!["feature".to_string(), kind.to_lowercase()];
        annotation.tooltip = Some(if label.is_empty() {
            format!("{} {}..{}", kind, location.start, location.end)
        } else {
            format!("{} {} {}..{}", kind, label, location.start, location.end)
        });
        annotation.label = label;
        if is_gene {
            annotation.direction = match location.strand {
                Some(Strand::Forward) => Some(Direction::Right),
                Some(Strand::Reverse) => Some(Direction::Left),
                None => None,
            };
        }
        if kind == "PFAM_domain" {
            if let Some(color) = pfam_accession(feature).and_then(|acc| pfam_colors.get(&acc)) {
                annotation.fill = Some(color.clone());
            }
        }
        data.annotations.push(annotation);
    }

    if skipped > 0 {
        warn!("{} features of record {} have no parseable location", skipped, record.id);
    }
    debug!(
        "record {}: {} tracks, {} annotations",
        record.id,
        data.tracks.len(),
        data.annotations.len()
    );
    Ok(ConvertedRecord { data, domain })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "version": "7.1.0",
        "records": [{
            "id": "Y16952",
            "features": [
                {"type": "region", "location": "[0:5000]",
                 "qualifiers": {"region_number": ["1"], "product": ["NRPS"], "rules": ["cds(Condensation)"]}},
                {"type": "region", "location": "[8000:12000]",
                 "qualifiers": {"region_number": ["2"], "product": ["T1PKS"]}},
                {"type": "CDS", "location": "[100:900](+)", "qualifiers": {"gene": ["nrpsA"]}},
                {"type": "CDS", "location": "[<4800:>6000](-)", "qualifiers": {"locus_tag": ["ctg1_5"]}},
                {"type": "PFAM_domain", "location": "[150:600](+)",
                 "qualifiers": {"db_xref": ["PF00668.21"], "description": ["Condensation"]}},
                {"type": "CDS", "location": "[9000:9500](+)", "qualifiers": {}},
                {"type": "misc", "location": "garbage"}
            ]
        }]
    }"#;

    fn record() -> Record {
        AntismashDocument::from_json(RECORD).unwrap().records.remove(0)
    }

    #[test]
    fn test_match_location() {
        assert_eq!(
            match_location("[<12:>345](+)"),
            Some(Location { start: 12, end: 345, strand: Some(Strand::Forward) })
        );
        assert_eq!(match_location("[5:10]"), Some(Location { start: 5, end: 10, strand: None }));
        assert_eq!(
            match_location("join{[1:10](-), [20:30](-)}"),
            Some(Location { start: 1, end: 30, strand: Some(Strand::Reverse) })
        );
        assert_eq!(match_location("nowhere"), None);
    }

    #[test]
    fn test_regions_sorted() {
        let regions = record().regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, "region_1");
        assert_eq!(regions[0].product, vec!["NRPS"]);
        assert_eq!(regions[0].rules, vec!["cds(Condensation)"]);
        assert_eq!(regions[1].product, vec!["T1PKS"]);
        assert!(regions[1].rules.is_empty());
    }

    #[test]
    fn test_region_features_overlap() {
        let record = record();
        let features = record.region_features("region_1").unwrap();
        // the partial overlap at 4800..6000 is included, the region itself is not
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.kind != "region"));
        assert!(record.region_features("region_9").is_err());
    }

    #[test]
    fn test_record_to_track_data() {
        let mut colors = PfamColorMap::new();
        colors.insert("PF00668".into(), "#8dd3c7".into());
        let converted = record_to_track_data(&record(), Some("region_1"), &colors).unwrap();
        assert_eq!(converted.domain, [0.0, 5000.0]);

        let data = &converted.data;
        let track_ids: Vec<_> = data.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(track_ids, vec!["CDS", "PFAM_domain"]);
        assert_eq!(data.primitives.len(), 2);

        let first = data.annotation("CDS-1").unwrap();
        assert_eq!(first.kind, AnnotationType::Arrow);
        assert_eq!(first.direction, Some(Direction::Right));
        assert_eq!(first.label, "nrpsA");
        assert_eq!(data.annotation("CDS-2").unwrap().direction, Some(Direction::Left));

        let domain = data.annotation("PFAM_domain-1").unwrap();
        assert_eq!(domain.kind, AnnotationType::Box);
        assert_eq!(domain.fill.as_deref(), Some("#8dd3c7"));
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_whole_record_skips_bad_locations() {
        let converted = record_to_track_data(&record(), None, &PfamColorMap::new()).unwrap();
        assert_eq!(converted.domain, [0.0, 12000.0]);
        assert!(!converted.data.has_track("misc"));
        assert!(converted.data.has_track("region"));
    }

    #[test]
    fn test_record_lookup() {
        let doc = AntismashDocument::from_json(RECORD).unwrap();
        assert_eq!(doc.record(None).unwrap().id, "Y16952");
        assert!(doc.record(Some("missing")).is_err());
    }
}
