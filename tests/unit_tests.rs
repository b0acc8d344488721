use std::fs;
use std::path::{Path, PathBuf};

use voc2yolo::{
    denormalize_box, destination_path, enumerate_units, extract_records, normalize_box,
    parse_annotation, resolve_image_size, write_unit_records, ClassTable, ConvertError,
    CornerBox, ImageSize, NormalizedBox, SourceUnit,
};

fn unit_for(path: &Path, root: &Path) -> SourceUnit {
    SourceUnit {
        path: path.to_path_buf(),
        rel_path: path.strip_prefix(root).unwrap().to_path_buf(),
    }
}

fn write_xml(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A valid PNG header is enough for dimension inspection; no pixel data or
/// checksum is required.
fn write_png(path: &Path, width: u32, height: u32) {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    fs::write(path, bytes).unwrap();
}

#[test]
fn test_normalize_box() {
    let size = ImageSize {
        width: 100,
        height: 50,
    };
    let bbox = CornerBox {
        xmin: 10.0,
        ymin: 10.0,
        xmax: 30.0,
        ymax: 30.0,
    };

    let normalized = normalize_box(size, bbox);

    assert_eq!(normalized.x_center, 0.2);
    assert_eq!(normalized.y_center, 0.4);
    assert_eq!(normalized.width, 0.2);
    assert_eq!(normalized.height, 0.4);
}

#[test]
fn test_normalize_round_trip() {
    let size = ImageSize {
        width: 353,
        height: 500,
    };
    let bbox = CornerBox {
        xmin: 48.0,
        ymin: 240.0,
        xmax: 195.0,
        ymax: 371.0,
    };

    let normalized = normalize_box(size, bbox);
    assert!(normalized.x_center >= 0.0 && normalized.x_center <= 1.0);
    assert!(normalized.y_center >= 0.0 && normalized.y_center <= 1.0);
    assert!(normalized.width >= 0.0 && normalized.width <= 1.0);
    assert!(normalized.height >= 0.0 && normalized.height <= 1.0);

    let recovered = denormalize_box(size, normalized);
    assert!((recovered.xmin - bbox.xmin).abs() < 1e-9);
    assert!((recovered.ymin - bbox.ymin).abs() < 1e-9);
    assert!((recovered.xmax - bbox.xmax).abs() < 1e-9);
    assert!((recovered.ymax - bbox.ymax).abs() < 1e-9);
}

#[test]
fn test_normalize_does_not_clamp() {
    let size = ImageSize {
        width: 100,
        height: 100,
    };
    // Box extending beyond the right image edge.
    let bbox = CornerBox {
        xmin: 90.0,
        ymin: 10.0,
        xmax: 130.0,
        ymax: 20.0,
    };

    let normalized = normalize_box(size, bbox);

    assert!(normalized.x_center > 1.0);
    assert_eq!(normalized.width, 0.4);
}

#[test]
fn test_class_table_resolve() {
    let table = ClassTable::new(vec!["cat".to_string(), "dog".to_string()]);

    assert_eq!(table.resolve("cat").unwrap(), 0);
    assert_eq!(table.resolve("dog").unwrap(), 1);
    assert!(matches!(
        table.resolve("bird"),
        Err(ConvertError::UnknownClass(name)) if name == "bird"
    ));
}

#[test]
fn test_class_table_exact_match_only() {
    let table = ClassTable::new(vec!["الف".to_string(), "Cat".to_string()]);

    assert_eq!(table.resolve("الف").unwrap(), 0);
    // No case folding or whitespace trimming.
    assert!(table.resolve("cat").is_err());
    assert!(table.resolve("Cat ").is_err());
}

#[test]
fn test_class_table_duplicate_keeps_first_index() {
    let table = ClassTable::new(vec![
        "cat".to_string(),
        "dog".to_string(),
        "cat".to_string(),
    ]);

    assert_eq!(table.resolve("cat").unwrap(), 0);
    assert_eq!(table.len(), 3);
}

#[test]
fn test_class_table_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("classes.txt");
    fs::write(&path, "cat\ndog\n\nbird\n").unwrap();

    let table = ClassTable::from_file(&path).unwrap();

    assert_eq!(table.names(), &["cat", "dog", "bird"]);
    assert_eq!(table.resolve("bird").unwrap(), 2);
}

#[test]
fn test_parse_annotation_extracts_objects_in_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("img1.xml");
    write_xml(
        &xml_path,
        r#"<annotation>
            <filename>img1.jpg</filename>
            <size><width>100</width><height>50</height><depth>3</depth></size>
            <object>
                <name>cat</name>
                <bndbox><xmin>10</xmin><ymin>10</ymin><xmax>30</xmax><ymax>30</ymax></bndbox>
            </object>
            <object>
                <name>dog</name>
                <bndbox><xmin>1</xmin><ymin>2</ymin><xmax>3</xmax><ymax>4</ymax></bndbox>
            </object>
        </annotation>"#,
    );

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let records = extract_records(&unit, &annotation);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].class_name, "cat");
    assert_eq!(records[0].bbox.xmin, 10.0);
    assert_eq!(records[1].class_name, "dog");
    assert_eq!(records[1].bbox.ymax, 4.0);
}

#[test]
fn test_parse_annotation_skips_incomplete_objects() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("partial.xml");
    write_xml(
        &xml_path,
        r#"<annotation>
            <size><width>100</width><height>100</height></size>
            <object>
                <name>cat</name>
                <bndbox><xmin>1</xmin><ymin>1</ymin><xmax>2</xmax><ymax>2</ymax></bndbox>
            </object>
            <object>
                <name>dog</name>
                <bndbox><xmin>1</xmin><ymin>1</ymin><ymax>2</ymax></bndbox>
            </object>
            <object>
                <name>cat</name>
                <bndbox><xmin>5</xmin><ymin>5</ymin><xmax>6</xmax><ymax>6</ymax></bndbox>
            </object>
        </annotation>"#,
    );

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let records = extract_records(&unit, &annotation);

    // The middle object misses xmax and is skipped; the rest survive.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].bbox.xmin, 1.0);
    assert_eq!(records[1].bbox.xmin, 5.0);
}

#[test]
fn test_parse_annotation_rejects_malformed_xml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("broken.xml");
    write_xml(&xml_path, "this is not xml at all");

    let unit = unit_for(&xml_path, temp_dir.path());
    let result = parse_annotation(&unit);

    assert!(matches!(result, Err(ConvertError::MalformedAnnotation(_))));
}

#[test]
fn test_resolve_image_size_prefers_embedded_size() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("img1.xml");
    write_xml(
        &xml_path,
        "<annotation><size><width>640</width><height>480</height></size></annotation>",
    );
    // A sibling image with conflicting dimensions must not be consulted.
    write_png(&temp_dir.path().join("img1.png"), 10, 10);

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let size = resolve_image_size(&unit, &annotation).unwrap();

    assert_eq!(
        size,
        ImageSize {
            width: 640,
            height: 480
        }
    );
}

#[test]
fn test_resolve_image_size_falls_back_to_sibling_image() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("img2.xml");
    write_xml(&xml_path, "<annotation></annotation>");
    write_png(&temp_dir.path().join("img2.png"), 320, 240);

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let size = resolve_image_size(&unit, &annotation).unwrap();

    assert_eq!(
        size,
        ImageSize {
            width: 320,
            height: 240
        }
    );
}

#[test]
fn test_resolve_image_size_keeps_dotted_stem_for_sibling_lookup() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("img.1.xml");
    write_xml(&xml_path, "<annotation></annotation>");
    // The true sibling shares the full stem; a neighboring image with a
    // truncated name must not be picked up instead.
    write_png(&temp_dir.path().join("img.1.png"), 320, 240);
    write_png(&temp_dir.path().join("img.png"), 10, 10);

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let size = resolve_image_size(&unit, &annotation).unwrap();

    assert_eq!(
        size,
        ImageSize {
            width: 320,
            height: 240
        }
    );
}

#[test]
fn test_resolve_image_size_falls_back_to_declared_filename() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("img3.xml");
    write_xml(
        &xml_path,
        "<annotation><filename>frame_0001.png</filename></annotation>",
    );
    write_png(&temp_dir.path().join("frame_0001.png"), 800, 600);

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let size = resolve_image_size(&unit, &annotation).unwrap();

    assert_eq!(
        size,
        ImageSize {
            width: 800,
            height: 600
        }
    );
}

#[test]
fn test_resolve_image_size_reports_tried_candidates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("orphan.xml");
    write_xml(
        &xml_path,
        "<annotation><filename>gone.jpg</filename></annotation>",
    );

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let result = resolve_image_size(&unit, &annotation);

    match result {
        Err(ConvertError::SizeUnresolved { tried }) => {
            assert!(!tried.is_empty());
            assert!(tried.iter().any(|p| p.ends_with("orphan.jpg")));
            assert!(tried.iter().any(|p| p.ends_with("gone.jpg")));
        }
        other => panic!("expected SizeUnresolved, got {:?}", other),
    }
}

#[test]
fn test_resolve_image_size_ignores_zero_embedded_size() {
    let temp_dir = tempfile::tempdir().unwrap();
    let xml_path = temp_dir.path().join("zero.xml");
    write_xml(
        &xml_path,
        "<annotation><size><width>0</width><height>0</height></size></annotation>",
    );
    write_png(&temp_dir.path().join("zero.png"), 64, 32);

    let unit = unit_for(&xml_path, temp_dir.path());
    let annotation = parse_annotation(&unit).unwrap();
    let size = resolve_image_size(&unit, &annotation).unwrap();

    assert_eq!(
        size,
        ImageSize {
            width: 64,
            height: 32
        }
    );
}

#[test]
fn test_system_monitor_first_sample_is_sane() {
    let mut monitor = voc2yolo::status::SystemMonitor::new();

    // Give the primed baseline a moment so the usage delta is measurable.
    std::thread::sleep(std::time::Duration::from_millis(250));
    let load = monitor.sample();

    assert!(load.cpu_percent.is_finite());
    assert!(load.cpu_percent >= 0.0);
    assert!(load.memory_total_bytes > 0);
    assert!(load.memory_used_bytes <= load.memory_total_bytes);
}

#[test]
fn test_destination_path_mirrors_relative_layout() {
    let dest = destination_path(Path::new("/out"), Path::new("a/b/img1.xml"));
    assert_eq!(dest, PathBuf::from("/out/a/b/img1.txt"));
}

#[test]
fn test_write_unit_records_creates_nested_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = vec![(
        0,
        NormalizedBox {
            x_center: 0.2,
            y_center: 0.4,
            width: 0.2,
            height: 0.4,
        },
    )];

    let dest = write_unit_records(temp_dir.path(), Path::new("deep/nested/img1.xml"), &records)
        .unwrap();

    assert_eq!(dest, temp_dir.path().join("deep/nested/img1.txt"));
    assert_eq!(fs::read_to_string(dest).unwrap(), "0 0.2 0.4 0.2 0.4\n");
}

#[test]
fn test_write_unit_records_empty_unit_writes_empty_file() {
    let temp_dir = tempfile::tempdir().unwrap();

    let dest = write_unit_records(temp_dir.path(), Path::new("empty.xml"), &[]).unwrap();

    assert!(dest.exists());
    assert_eq!(fs::read_to_string(dest).unwrap(), "");
}

#[test]
fn test_write_unit_records_overwrites_existing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("img.txt"), "stale content\n").unwrap();

    let dest = write_unit_records(temp_dir.path(), Path::new("img.xml"), &[]).unwrap();

    assert_eq!(fs::read_to_string(dest).unwrap(), "");
}

#[test]
fn test_enumerate_units_collects_xml_recursively() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_xml(&temp_dir.path().join("a/img1.xml"), "<annotation/>");
    write_xml(&temp_dir.path().join("a/b/img2.xml"), "<annotation/>");
    write_xml(&temp_dir.path().join("img3.XML"), "<annotation/>");
    fs::write(temp_dir.path().join("notes.txt"), "not an annotation").unwrap();

    let units = enumerate_units(temp_dir.path(), "xml").unwrap();

    assert_eq!(units.len(), 3);
    let rels: Vec<_> = units.iter().map(|u| u.rel_path.clone()).collect();
    assert!(rels.contains(&PathBuf::from("a/img1.xml")));
    assert!(rels.contains(&PathBuf::from("a/b/img2.xml")));
    assert!(rels.contains(&PathBuf::from("img3.XML")));
}

#[test]
fn test_enumerate_units_missing_root_is_run_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("does_not_exist");

    let result = enumerate_units(&missing, "xml");

    assert!(matches!(
        result,
        Err(voc2yolo::RunError::Enumeration { .. })
    ));
}
