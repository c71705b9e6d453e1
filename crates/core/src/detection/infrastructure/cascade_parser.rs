//! Reader for the XML cascade serialization (current and legacy layouts).

use std::str::FromStr;

use roxmltree::{Document, Node};

use super::haar_cascade::{
    CascadeError, HaarCascade, HaarFeature, Stage, TreeNode, WeakClassifier, WeightedRect,
};

/// Stage thresholds are relaxed by this much on load so that borderline
/// windows seen during training still pass.
const STAGE_THRESHOLD_EPS: f32 = 1e-5;

pub(crate) fn parse(text: &str) -> Result<HaarCascade, CascadeError> {
    let doc = Document::parse(text)?;
    let storage = doc.root_element();
    let top = elements(storage)
        .next()
        .ok_or(CascadeError::Missing("cascade"))?;

    if child(top, "stageType").is_some() {
        parse_current(top)
    } else if child(top, "size").is_some() {
        parse_legacy(top)
    } else {
        Err(CascadeError::Missing("stageType"))
    }
}

fn parse_current(top: Node) -> Result<HaarCascade, CascadeError> {
    let stage_type = text_of(required(top, "stageType")?);
    if stage_type != "BOOST" {
        return Err(CascadeError::Unsupported(format!("stage type {stage_type}")));
    }
    let feature_type = text_of(required(top, "featureType")?);
    if !feature_type.eq_ignore_ascii_case("HAAR") {
        return Err(CascadeError::Unsupported(format!(
            "feature type {feature_type}"
        )));
    }
    if let Some(params) = child(top, "featureParams") {
        if let Some(cats) = child(params, "maxCatCount") {
            let cats: u32 = scalar(cats, "maxCatCount")?;
            if cats != 0 {
                return Err(CascadeError::Unsupported(
                    "categorical tree splits".into(),
                ));
            }
        }
    }

    let width: u32 = scalar(required(top, "width")?, "width")?;
    let height: u32 = scalar(required(top, "height")?, "height")?;

    let mut stages = Vec::new();
    for stage_node in elements(required(top, "stages")?) {
        let threshold: f32 = scalar(required(stage_node, "stageThreshold")?, "stageThreshold")?;
        let mut classifiers = Vec::new();
        for wc_node in elements(required(stage_node, "weakClassifiers")?) {
            classifiers.push(parse_weak_classifier(wc_node)?);
        }
        stages.push(Stage {
            threshold: threshold - STAGE_THRESHOLD_EPS,
            classifiers,
        });
    }

    let mut features = Vec::new();
    for feature_node in elements(required(top, "features")?) {
        features.push(parse_feature(feature_node)?);
    }

    HaarCascade::new((width, height), stages, features)
}

/// `internalNodes` holds `left right feature threshold` quadruples.
fn parse_weak_classifier(node: Node) -> Result<WeakClassifier, CascadeError> {
    let internal = text_of(required(node, "internalNodes")?);
    let tokens: Vec<&str> = internal.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 4 != 0 {
        return Err(CascadeError::InvalidValue {
            field: "internalNodes",
            value: internal.to_string(),
        });
    }

    let mut nodes = Vec::with_capacity(tokens.len() / 4);
    for quad in tokens.chunks_exact(4) {
        nodes.push(TreeNode {
            left: token(quad[0], "internalNodes")?,
            right: token(quad[1], "internalNodes")?,
            feature: token(quad[2], "internalNodes")?,
            threshold: token(quad[3], "internalNodes")?,
        });
    }
    let leaves = list(required(node, "leafValues")?, "leafValues")?;

    Ok(WeakClassifier { nodes, leaves })
}

fn parse_feature(node: Node) -> Result<HaarFeature, CascadeError> {
    if let Some(tilted) = child(node, "tilted") {
        let tilted: i32 = scalar(tilted, "tilted")?;
        if tilted != 0 {
            return Err(CascadeError::Unsupported("tilted Haar features".into()));
        }
    }

    let mut rects = Vec::new();
    for rect_node in elements(required(node, "rects")?) {
        let values: Vec<f32> = list(rect_node, "rects")?;
        let [x, y, w, h, weight] = values[..] else {
            return Err(CascadeError::InvalidValue {
                field: "rects",
                value: text_of(rect_node).to_string(),
            });
        };
        if [x, y, w, h].iter().any(|v| *v < 0.0 || v.fract() != 0.0) {
            return Err(CascadeError::InvalidValue {
                field: "rects",
                value: text_of(rect_node).to_string(),
            });
        }
        rects.push(WeightedRect {
            x: x as u32,
            y: y as u32,
            width: w as u32,
            height: h as u32,
            weight,
        });
    }
    Ok(HaarFeature { rects })
}

/// Legacy layout: trees of nodes that embed their feature and use
/// `left_val`/`right_val` leaves or `left_node`/`right_node` links.
fn parse_legacy(top: Node) -> Result<HaarCascade, CascadeError> {
    let size: Vec<u32> = list(required(top, "size")?, "size")?;
    let [width, height] = size[..] else {
        return Err(CascadeError::InvalidValue {
            field: "size",
            value: format!("{size:?}"),
        });
    };

    let mut stages = Vec::new();
    let mut features = Vec::new();
    for (si, stage_node) in elements(required(top, "stages")?).enumerate() {
        check_linear_stage(stage_node, si)?;

        let threshold: f32 =
            scalar(required(stage_node, "stage_threshold")?, "stage_threshold")?;
        let mut classifiers = Vec::new();
        for tree_node in elements(required(stage_node, "trees")?) {
            classifiers.push(parse_legacy_tree(tree_node, &mut features)?);
        }
        stages.push(Stage {
            threshold: threshold - STAGE_THRESHOLD_EPS,
            classifiers,
        });
    }

    HaarCascade::new((width, height), stages, features)
}

/// Stage trees (a `parent` other than the previous stage) are not supported.
fn check_linear_stage(stage_node: Node, index: usize) -> Result<(), CascadeError> {
    if let Some(parent) = child(stage_node, "parent") {
        let parent: i64 = scalar(parent, "parent")?;
        if parent != index as i64 - 1 {
            return Err(CascadeError::Unsupported("tree-structured stages".into()));
        }
    }
    if let Some(next) = child(stage_node, "next") {
        let next: i64 = scalar(next, "next")?;
        if next != -1 {
            return Err(CascadeError::Unsupported("tree-structured stages".into()));
        }
    }
    Ok(())
}

fn parse_legacy_tree(
    tree_node: Node,
    features: &mut Vec<HaarFeature>,
) -> Result<WeakClassifier, CascadeError> {
    let mut nodes = Vec::new();
    let mut leaves = Vec::new();

    for node in elements(tree_node) {
        features.push(parse_feature(required(node, "feature")?)?);
        let feature = features.len() - 1;
        let threshold: f32 = scalar(required(node, "threshold")?, "threshold")?;
        let left = legacy_branch(node, "left_node", "left_val", &mut leaves)?;
        let right = legacy_branch(node, "right_node", "right_val", &mut leaves)?;
        nodes.push(TreeNode {
            left,
            right,
            feature,
            threshold,
        });
    }

    Ok(WeakClassifier { nodes, leaves })
}

fn legacy_branch(
    node: Node,
    node_tag: &'static str,
    leaf_tag: &'static str,
    leaves: &mut Vec<f32>,
) -> Result<i32, CascadeError> {
    if let Some(link) = child(node, node_tag) {
        return scalar(link, node_tag);
    }
    let value: f32 = scalar(required(node, leaf_tag)?, leaf_tag)?;
    leaves.push(value);
    Ok(-((leaves.len() - 1) as i32))
}

// ── XML helpers ──────────────────────────────────────────────────────

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    elements(node).find(|n| n.has_tag_name(name))
}

fn required<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, CascadeError> {
    child(node, name).ok_or(CascadeError::Missing(name))
}

/// Trimmed text content of a node.
fn text_of<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

fn token<T: FromStr>(raw: &str, field: &'static str) -> Result<T, CascadeError> {
    raw.parse().map_err(|_| CascadeError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

fn scalar<T: FromStr>(node: Node, field: &'static str) -> Result<T, CascadeError> {
    token(text_of(node), field)
}

fn list<T: FromStr>(node: Node, field: &'static str) -> Result<Vec<T>, CascadeError> {
    text_of(node)
        .split_whitespace()
        .map(|t| token(t, field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::edge_cascade_xml;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const LEGACY: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<legacy_face type_id="opencv-haar-classifier">
  <size>6 4</size>
  <stages>
    <_>
      <trees>
        <_>
          <_>
            <feature>
              <rects>
                <_>0 0 6 2 1.</_>
                <_>0 2 6 2 -1.</_>
              </rects>
              <tilted>0</tilted>
            </feature>
            <threshold>0.25</threshold>
            <left_val>-1.</left_val>
            <right_node>1</right_node>
          </_>
          <_>
            <feature>
              <rects>
                <_>0 0 3 4 1.</_>
                <_>3 0 3 4 -1.</_>
              </rects>
              <tilted>0</tilted>
            </feature>
            <threshold>0.5</threshold>
            <left_val>0.75</left_val>
            <right_val>-0.5</right_val>
          </_>
        </_>
      </trees>
      <stage_threshold>0.5</stage_threshold>
      <parent>-1</parent>
      <next>-1</next>
    </_>
  </stages>
</legacy_face>
</opencv_storage>
"#;

    #[test]
    fn test_parses_current_layout() {
        let cascade = parse(&edge_cascade_xml(24, 24)).unwrap();
        assert_eq!(cascade.window_size(), (24, 24));
        assert_eq!(cascade.stages().len(), 1);
        assert_eq!(cascade.features().len(), 1);

        let stage = &cascade.stages()[0];
        assert_relative_eq!(stage.threshold, -STAGE_THRESHOLD_EPS);
        let wc = &stage.classifiers[0];
        assert_eq!(wc.nodes.len(), 1);
        assert_eq!(wc.nodes[0].left, 0);
        assert_eq!(wc.nodes[0].right, -1);
        assert_eq!(wc.leaves, vec![-1.0, 1.0]);

        let rects = &cascade.features()[0].rects;
        assert_eq!(rects.len(), 2);
        assert_eq!((rects[1].x, rects[1].y, rects[1].width, rects[1].height), (0, 12, 24, 12));
        assert_relative_eq!(rects[1].weight, -1.0);
    }

    #[test]
    fn test_parses_legacy_layout() {
        let cascade = parse(LEGACY).unwrap();
        assert_eq!(cascade.window_size(), (6, 4));
        assert_eq!(cascade.features().len(), 2);

        let stage = &cascade.stages()[0];
        assert_relative_eq!(stage.threshold, 0.5 - STAGE_THRESHOLD_EPS);
        let wc = &stage.classifiers[0];
        assert_eq!(
            wc.nodes[0],
            TreeNode {
                left: 0,
                right: 1,
                feature: 0,
                threshold: 0.25
            }
        );
        assert_eq!(
            wc.nodes[1],
            TreeNode {
                left: -1,
                right: -2,
                feature: 1,
                threshold: 0.5
            }
        );
        assert_eq!(wc.leaves, vec![-1.0, 0.75, -0.5]);
    }

    #[test]
    fn test_rejects_non_xml() {
        assert!(matches!(parse("not a cascade"), Err(CascadeError::Xml(_))));
    }

    #[test]
    fn test_rejects_empty_storage() {
        let err = parse("<opencv_storage></opencv_storage>").unwrap_err();
        assert!(matches!(err, CascadeError::Missing("cascade")));
    }

    #[rstest]
    #[case::lbp("<featureType>HAAR</featureType>", "<featureType>LBP</featureType>")]
    #[case::tilted("<tilted>0</tilted>", "<tilted>1</tilted>")]
    #[case::stage_type("<stageType>BOOST</stageType>", "<stageType>OTHER</stageType>")]
    fn test_rejects_unsupported(#[case] from: &str, #[case] to: &str) {
        let xml = edge_cascade_xml(24, 24).replace(from, to);
        assert!(matches!(parse(&xml), Err(CascadeError::Unsupported(_))));
    }

    #[test]
    fn test_reports_missing_width() {
        let xml = edge_cascade_xml(24, 24).replace("<width>24</width>", "");
        assert!(matches!(parse(&xml), Err(CascadeError::Missing("width"))));
    }

    #[test]
    fn test_reports_missing_leaf_values() {
        let xml = edge_cascade_xml(24, 24)
            .replace("<leafValues>", "<leaves>")
            .replace("</leafValues>", "</leaves>");
        assert!(matches!(parse(&xml), Err(CascadeError::Missing("leafValues"))));
    }

    #[test]
    fn test_rejects_garbage_numbers() {
        let xml = edge_cascade_xml(24, 24).replace("<width>24</width>", "<width>wide</width>");
        let err = parse(&xml).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidValue { field: "width", .. }));
    }

    #[test]
    fn test_rejects_truncated_internal_nodes() {
        let xml = edge_cascade_xml(24, 24).replace("0 -1 0 0.5", "0 -1 0");
        let err = parse(&xml).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidValue { field: "internalNodes", .. }));
    }

    #[test]
    fn test_rejects_short_rect() {
        let xml = edge_cascade_xml(24, 24).replace("0 12 24 12 -1.", "0 12 24 -1.");
        let err = parse(&xml).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidValue { field: "rects", .. }));
    }

    #[test]
    fn test_rejects_stage_trees_in_legacy_layout() {
        let xml = LEGACY.replace("<next>-1</next>", "<next>3</next>");
        assert!(matches!(parse(&xml), Err(CascadeError::Unsupported(_))));
    }
}
