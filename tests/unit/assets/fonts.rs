use super::*;

fn face(tag: u8) -> FontFace {
    FontFace::new(vec![tag; 4], 0)
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("checkforge-fonts-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn no_fonts_is_empty() {
    let set = NoFonts.load().unwrap();
    assert!(set.is_empty());
    assert!(set.face(FontRole::Regular).is_none());
}

#[test]
fn roles_fall_back_to_regular() {
    let set = FontSet {
        regular: Some(face(1)),
        bold: None,
        micr: None,
    };
    assert_eq!(set.face(FontRole::Bold).unwrap().bytes[0], 1);
    assert_eq!(set.face(FontRole::Micr).unwrap().bytes[0], 1);
    assert!(!set.has_micr_face());

    let set = FontSet {
        regular: Some(face(1)),
        bold: Some(face(2)),
        micr: Some(face(3)),
    };
    assert_eq!(set.face(FontRole::Bold).unwrap().bytes[0], 2);
    assert_eq!(set.face(FontRole::Micr).unwrap().bytes[0], 3);
}

#[test]
fn fs_loader_classifies_by_file_name() {
    let dir = temp_dir("classify");
    std::fs::write(dir.join("Inter-Regular.ttf"), [1u8]).unwrap();
    std::fs::write(dir.join("Inter-Bold.ttf"), [2u8]).unwrap();
    std::fs::write(dir.join("GnuMICR.otf"), [3u8]).unwrap();
    std::fs::write(dir.join("readme.txt"), [9u8]).unwrap();

    let set = FsFontLoader::new(&dir).load().unwrap();
    assert_eq!(set.regular.as_ref().unwrap().bytes.as_slice(), &[1]);
    assert_eq!(set.bold.as_ref().unwrap().bytes.as_slice(), &[2]);
    let micr = set.micr.as_ref().unwrap();
    assert_eq!(micr.bytes.as_slice(), &[3]);
    assert_eq!(micr.micr_glyphs, MicrGlyphs::Letters);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn fs_loader_errors_on_empty_or_missing_dir() {
    let dir = temp_dir("empty");
    let err = FsFontLoader::new(&dir).load().unwrap_err();
    assert!(matches!(err, CheckForgeError::ResourceLoad(_)));

    let err = FsFontLoader::new(dir.join("missing")).load().unwrap_err();
    assert!(matches!(err, CheckForgeError::ResourceLoad(_)));
    let _ = std::fs::remove_dir_all(&dir);
}
