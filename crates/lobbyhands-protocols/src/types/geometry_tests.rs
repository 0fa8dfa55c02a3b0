use super::*;

#[test]
fn test_position_far_from() {
    let fixed = Position::new(960, 540);
    assert!(!fixed.is_far_from(Position::new(965, 535), 10));
    assert!(fixed.is_far_from(Position::new(975, 540), 10));
    assert!(fixed.is_far_from(Position::new(960, 520), 10));
}

#[test]
fn test_position_display() {
    assert_eq!(Position::new(3, -4).to_string(), "(3, -4)");
}

#[test]
fn test_region_to_absolute() {
    let region = Region::new(100, 200, 50, 50);
    assert_eq!(region.to_absolute(5, 7), Position::new(105, 207));
}

#[test]
fn test_region_is_empty() {
    assert!(Region::new(0, 0, 0, 10).is_empty());
    assert!(!Region::new(0, 0, 1, 1).is_empty());
}

#[test]
fn test_percent_region_resolve() {
    let chat = PercentRegion {
        left: 20.0,
        top: 35.0,
        width: 60.0,
        height: 40.0,
    };
    let region = chat.resolve(1920, 1080);
    assert_eq!(region, Region::new(384, 378, 1152, 432));
}

#[test]
fn test_percent_insets_resolve() {
    let insets = PercentInsets {
        top: 10.0,
        bottom: 10.0,
        left: 25.0,
        right: 25.0,
    };
    let region = insets.resolve(1000, 500);
    assert_eq!(region, Region::new(250, 50, 500, 400));
}

#[test]
fn test_percent_insets_saturate() {
    let insets = PercentInsets {
        top: 60.0,
        bottom: 60.0,
        left: 0.0,
        right: 0.0,
    };
    assert_eq!(insets.resolve(100, 100).height, 0);
}

#[test]
fn test_rgb_matches_with_tolerance() {
    let target = Rgb::new(200, 40, 40);
    assert!(target.matches(Rgb::new(210, 30, 45), 10));
    assert!(!target.matches(Rgb::new(211, 40, 40), 10));
    assert!(target.matches(target, 0));
}

#[test]
fn test_rgb_serde_as_array() {
    let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
    assert_eq!(json, "[1,2,3]");
}
