//! Builds real decks from temp photo trees through the public API, then
//! re-opens the archives with `zip` and re-parses slides with `quick-xml`.

use photodeck::collect::TraversalPolicy;
use photodeck::compose::PlacementPolicy;
use photodeck::imaging::Quality;
use photodeck::patch::{self, PRESENTATION_NS, TransitionKind, TransitionSpec};
use photodeck::pipeline::{BuildOptions, TransitionOptions, build};
use photodeck::types::{Rgb, SlideGeometry};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::Path;
use tempfile::TempDir;
use zip::ZipArchive;

fn write_jpeg(path: &Path, w: u32, h: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([(x * 7) as u8, (y * 5) as u8, 90]));
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

fn read_members(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut members = BTreeMap::new();
    for i in 0..archive.len() {
        let mut member = archive.by_index(i).unwrap();
        if member.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        member.read_to_end(&mut bytes).unwrap();
        members.insert(member.name().to_string(), bytes);
    }
    members
}

/// Attributes of every PresentationML `transition` element.
fn transitions(xml: &[u8]) -> Vec<BTreeMap<String, String>> {
    let mut reader = NsReader::from_reader(Cursor::new(xml));
    let mut buf = Vec::new();
    let mut found = Vec::new();
    loop {
        match reader.read_resolved_event_into(&mut buf).unwrap() {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(e) | Event::Empty(e))
                if ns == PRESENTATION_NS && e.local_name().as_ref() == b"transition" =>
            {
                let attrs = e
                    .attributes()
                    .map(|a| {
                        let a = a.unwrap();
                        (
                            String::from_utf8(a.key.as_ref().to_vec()).unwrap(),
                            a.unescape_value().unwrap().into_owned(),
                        )
                    })
                    .collect();
                found.push(attrs);
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }
    found
}

fn slide_names(members: &BTreeMap<String, Vec<u8>>) -> Vec<&str> {
    members
        .keys()
        .map(String::as_str)
        .filter(|n| patch::is_slide_part(n))
        .collect()
}

fn options(input: &Path, out: &Path) -> BuildOptions {
    BuildOptions {
        input_dir: input.to_path_buf(),
        output: out.join("Photos_Presentation.pptx"),
        traversal: TraversalPolicy::Flatten,
        geometry: SlideGeometry::STANDARD,
        placement: PlacementPolicy::Letterbox,
        fill: Rgb::BLACK,
        quality: Quality::default(),
        transitions: Some(TransitionOptions {
            spec: TransitionSpec::default(),
            output: out.join("Photos_Presentation_with_transitions.pptx"),
        }),
    }
}

#[test]
fn nested_folders_become_ordered_slides_with_transitions() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_jpeg(&input.path().join("B/1.jpg"), 48, 32);
    write_jpeg(&input.path().join("A/2.jpg"), 32, 48);
    write_jpeg(&input.path().join("A/1.jpg"), 40, 40);
    fs::write(input.path().join("A/notes.txt"), "not an image").unwrap();

    let report = build(&options(input.path(), out.path()), None).unwrap();
    assert_eq!(report.slides, vec!["A/1.jpg", "A/2.jpg", "B/1.jpg"]);
    assert!(report.skipped.is_empty());

    let plain_before = fs::read(&report.deck).unwrap();
    let plain = read_members(&report.deck);
    assert_eq!(
        slide_names(&plain),
        vec![
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/slide3.xml"
        ]
    );
    for name in slide_names(&plain) {
        assert!(transitions(&plain[name]).is_empty(), "{name} already has one");
    }

    let patch_report = report.transitions.unwrap();
    assert_eq!(patch_report.patched.len(), 3);
    assert!(patch_report.skipped.is_empty());

    let patched = read_members(&patch_report.output);
    assert_eq!(
        patched.keys().collect::<Vec<_>>(),
        plain.keys().collect::<Vec<_>>()
    );
    for (name, bytes) in &patched {
        if patch::is_slide_part(name) {
            let found = transitions(bytes);
            assert_eq!(found.len(), 1, "{name}");
            assert_eq!(found[0]["advTm"], "4000");
            assert_eq!(found[0]["advClick"], "1");
            assert_eq!(found[0]["spd"], "slow");
        } else {
            assert_eq!(bytes, &plain[name], "{name} changed");
        }
    }

    // source deck is only read
    assert_eq!(fs::read(&report.deck).unwrap(), plain_before);
}

#[test]
fn patching_an_existing_deck_twice_keeps_one_transition() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_jpeg(&input.path().join("1.jpg"), 20, 20);

    let mut opts = options(input.path(), out.path());
    opts.transitions = None;
    let report = build(&opts, None).unwrap();

    let once = out.path().join("once.pptx");
    let twice = out.path().join("twice.pptx");
    let spec = TransitionSpec {
        kind: TransitionKind::Push,
        duration_secs: 1.5,
        ..TransitionSpec::default()
    };
    patch::add_transitions(&report.deck, &once, &TransitionSpec::default()).unwrap();
    patch::add_transitions(&once, &twice, &spec).unwrap();

    let members = read_members(&twice);
    let found = transitions(&members["ppt/slides/slide1.xml"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["advTm"], "1500");
    assert!(String::from_utf8_lossy(&members["ppt/slides/slide1.xml"]).contains("push"));
}

#[test]
fn corrupt_deck_leaves_no_output() {
    let tmp = TempDir::new().unwrap();
    let deck = tmp.path().join("broken.pptx");
    fs::write(&deck, b"PK\x03\x04 definitely truncated").unwrap();
    let target = tmp.path().join("out.pptx");

    let result = patch::add_transitions(&deck, &target, &TransitionSpec::default());
    assert!(result.is_err());
    assert!(!target.exists());
    let leftovers: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "{leftovers:?}");
}
