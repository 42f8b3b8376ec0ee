// ../tests/tests.rs
use gw2_render::compositor::{ICON_SIZE, TILE_HEIGHT, TILE_WIDTH, major_position};
use gw2_render::fetch::ImageSource;
use gw2_render::*;
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::Cursor;
use strum::IntoEnumIterator;
use tokio::time::Duration;

fn sample_fact(kind: FactType, label: &str) -> Fact {
    let value = match kind {
        FactType::Recharge | FactType::ResourceCost | FactType::Number => {
            json!({"type": kind.as_ref(), "text": label, "value": 5})
        }
        FactType::Damage => {
            json!({"type": "Damage", "text": label, "hit_count": 1, "dmg_multiplier": 1.0})
        }
        FactType::Percent => json!({"type": "Percent", "text": label, "percent": 25}),
        FactType::AttributeAdjust => {
            json!({"type": "AttributeAdjust", "text": label, "value": 120})
        }
        FactType::BuffConversion => json!({
            "type": "BuffConversion", "text": label, "source": "Power", "target": "Ferocity", "percent": 10
        }),
        FactType::Buff => json!({
            "type": "Buff", "text": label, "status": "Might", "duration": 5, "apply_count": 1
        }),
        FactType::PrefixedBuff => json!({
            "type": "PrefixedBuff", "text": label, "status": "Might", "apply_count": 1,
            "prefix": {"status": "Stability"}
        }),
        FactType::Radius | FactType::Distance => {
            json!({"type": kind.as_ref(), "text": label, "distance": 240})
        }
        FactType::Duration | FactType::Time => {
            json!({"type": kind.as_ref(), "text": label, "duration": 3})
        }
        FactType::ComboField => json!({"type": "ComboField", "text": label, "field_type": "Fire"}),
        FactType::Heal | FactType::HealingAdjust => {
            json!({"type": kind.as_ref(), "text": label, "hit_count": 1})
        }
        FactType::NoData | FactType::Unblockable | FactType::StunBreak => {
            json!({"type": kind.as_ref(), "text": label})
        }
        FactType::Range => json!({"type": "Range", "text": label, "value": 900}),
        FactType::ComboFinisher => json!({
            "type": "ComboFinisher", "text": label, "finisher_type": "Blast", "percent": 100
        }),
    };
    serde_json::from_value(value).expect("sample fact")
}

#[test]
fn test_shuffled_facts_sort_into_canonical_stable_order() {
    // Two facts of every kind, told apart by their label.
    let mut facts: Vec<Fact> = FactType::iter()
        .flat_map(|kind| {
            [
                sample_fact(kind, &format!("{kind}-first")),
                sample_fact(kind, &format!("{kind}-second")),
            ]
        })
        .collect();

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        facts.shuffle(&mut rng);

        let ordered = order_facts(&facts);
        let kinds: Vec<FactType> = ordered.iter().map(|fact| fact.kind()).collect();
        let expected: Vec<FactType> = FactType::iter().flat_map(|kind| [kind, kind]).collect();
        assert_eq!(kinds, expected);

        // Same-kind facts keep the order they had in the input.
        for kind in FactType::iter() {
            let input: Vec<&Fact> = facts.iter().filter(|fact| fact.kind() == kind).collect();
            let output: Vec<&Fact> = ordered
                .iter()
                .copied()
                .filter(|fact| fact.kind() == kind)
                .collect();
            assert_eq!(input, output, "{kind} lost its document order");
        }
    }
}

#[test]
fn test_priority_table_matches_tooltip_order() {
    let kinds: Vec<FactType> = FactType::iter().collect();
    let order: Vec<&str> = kinds.iter().map(|kind| kind.as_ref()).collect();
    assert_eq!(
        order,
        vec![
            "Recharge", "ResourceCost", "Damage", "Percent", "AttributeAdjust", "BuffConversion",
            "Buff", "PrefixedBuff", "Number", "Radius", "Duration", "Time", "Distance",
            "ComboField", "Heal", "HealingAdjust", "NoData", "Unblockable", "Range",
            "ComboFinisher", "StunBreak",
        ]
    );
}

fn warrior_skill() -> Skill {
    serde_json::from_value(json!({
        "id": 14402,
        "name": "Hundred Blades",
        "description": "Slash your foe. <c=@reminder>Deals ConditionDamage.</c>",
        "icon": "https://render.example/hundred_blades.png",
        "slot": "Weapon_2",
        "weapon_type": "Greatsword",
        "cost": 10,
        "professions": ["Warrior"],
        "facts": [
            {"type": "Damage", "text": "Damage", "hit_count": 8, "dmg_multiplier": 0.5},
            {"type": "Buff", "text": "Apply", "status": "Vulnerability", "duration": 8,
             "apply_count": 1, "description": "Incoming damage increased."},
            {"type": "Recharge", "text": "Recharge", "value": 8},
            {"type": "AttributeAdjust", "target": "CritDamage", "value": 1000},
            {"type": "Unblockable"}
        ]
    }))
    .expect("valid skill")
}

fn config_with_glyphs() -> RenderConfig {
    let mut settings = Settings::new();
    for key in ["recharge", "damage", "vulnerability", "adrenaline"] {
        settings.glyphs.insert(key.to_string(), format!("[{key}]"));
    }
    settings.allow_custom_glyphs = false;
    settings.render_config()
}

#[test]
fn test_skill_tooltip_lines() {
    let config = config_with_glyphs();
    let record = TooltipBuilder::new(&config).skill(&warrior_skill());

    assert_eq!(record.title, "Hundred Blades");
    assert_eq!(
        record.description.as_deref(),
        Some("Slash your foe. Deals Condition Damage.")
    );
    assert_eq!(record.color, 0xFFD166);
    assert_eq!(
        record.thumbnail.as_deref(),
        Some("https://render.example/hundred_blades.png")
    );
    let footer = record.footer.expect("single profession footer");
    assert_eq!(footer.text, "Warrior Greatsword skill 2");

    assert_eq!(
        record.lines,
        vec![
            "[recharge]Recharge: 8s",
            "[adrenaline]Adrenaline cost: 10",
            "[damage]Damage (8x): 1616 (4.0)",
            // Glyphs are matched before attribute names are rewritten.
            "[damage]Ferocity: 1,000",
            "[vulnerability]1 Vulnerability(8s): Incoming damage increased.",
            "Unblockable",
        ]
    );
}

#[test]
fn test_rendering_twice_is_identical() {
    let config = RenderConfig::default();
    let builder = TooltipBuilder::new(&config);
    let skill = warrior_skill();
    assert_eq!(builder.skill(&skill), builder.skill(&skill));
}

#[test]
fn test_multi_profession_skill_has_no_footer_or_resource() {
    let config = RenderConfig::default();
    let mut skill = warrior_skill();
    skill.professions.push("Guardian".to_string());

    let record = TooltipBuilder::new(&config).skill(&skill);
    assert!(record.footer.is_none());
    assert_eq!(record.color, config.default_color);
    assert!(!record.lines.iter().any(|line| line.contains("cost")));
}

#[test]
fn test_prefix_gets_its_own_glyph() {
    let mut settings = Settings::new();
    settings.glyphs.insert("stability".to_string(), "[stab]".to_string());
    settings.glyphs.insert("might".to_string(), "[might]".to_string());
    let config = settings.render_config();

    let trait_doc: Trait = serde_json::from_value(json!({
        "id": 1, "name": "Strength in Numbers",
        "facts": [{
            "type": "PrefixedBuff", "status": "Might", "duration": 4, "apply_count": 1,
            "description": "More damage.", "prefix": {"status": "Stability"}
        }]
    }))
    .expect("valid trait");

    let record = TooltipBuilder::new(&config).build_trait(&trait_doc);
    assert_eq!(record.lines, vec!["[stab]Stability [might]Might(4s): More damage."]);
    assert!(record.footer.is_none());
}

#[test]
fn test_duplicate_skills_collapse_to_the_later_one() {
    let first = warrior_skill();
    let mut second = warrior_skill();
    second.id = 99;
    let mut different = warrior_skill();
    different.id = 7;
    different.name = "Whirlwind Attack".to_string();

    let unique = dedupe_skills(vec![first, different, second]);
    let ids: Vec<u32> = unique.iter().map(|skill| skill.id).collect();
    assert_eq!(ids, vec![99, 7]);
}

// region:  --- Images

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut output = Cursor::new(Vec::new());
    image
        .write_to(&mut output, ImageFormat::Png)
        .expect("encode png");
    output.into_inner()
}

fn art(name: &str, active: [bool; 9]) -> SpecializationArt {
    SpecializationArt {
        name: name.to_string(),
        background: png(645, 256, [40, 80, 160, 255]),
        minor_icons: (0..3).map(|_| png(64, 64, [250, 200, 20, 255])).collect(),
        major_icons: active
            .iter()
            .map(|&active| TraitIcon {
                bytes: png(64, 64, [200, 30, 30, 255]),
                active,
            })
            .collect(),
    }
}

#[test]
fn test_tile_geometry_is_fixed() {
    let none = render_specialization(&art("Strength", [false; 9])).expect("tile");
    let all = render_specialization(&art("Strength", [true; 9])).expect("tile");
    assert_eq!(none.image.dimensions(), (TILE_WIDTH, TILE_HEIGHT));
    assert_eq!(all.image.dimensions(), (TILE_WIDTH, TILE_HEIGHT));

    // Small backgrounds are padded rather than shrinking the tile.
    let mut small = art("Small", [true; 9]);
    small.background = png(200, 150, [10, 10, 10, 255]);
    let tile = render_specialization(&small).expect("tile");
    assert_eq!(tile.image.dimensions(), (TILE_WIDTH, TILE_HEIGHT));
}

#[test]
fn test_inactive_trait_only_differs_by_darkening() {
    let mut active = [true; 9];
    let lit = render_specialization(&art("Defense", active)).expect("tile");
    active[0] = false;
    let dim = render_specialization(&art("Defense", active)).expect("tile");

    let (left, top) = major_position(0);
    let (left, top) = (left as u32, top as u32);
    let inside = |x: u32, y: u32| {
        x >= left && x < left + ICON_SIZE && y >= top && y < top + ICON_SIZE
    };

    for (x, y, pixel) in lit.image.enumerate_pixels() {
        if !inside(x, y) {
            assert_eq!(pixel, dim.image.get_pixel(x, y), "pixel {x},{y} moved");
        }
    }

    let center = (left + ICON_SIZE / 2, top + ICON_SIZE / 2);
    let mut expected = *lit.image.get_pixel(center.0, center.1);
    expected.blend(&Rgba([0, 0, 0, 135]));
    let actual = dim.image.get_pixel(center.0, center.1);
    for channel in 0..4 {
        assert!(
            actual[channel].abs_diff(expected[channel]) <= 2,
            "channel {channel}: {actual:?} vs {expected:?}"
        );
    }
}

#[test]
fn test_outside_of_hexagon_is_darkened() {
    let tile = render_specialization(&art("Arms", [true; 9])).expect("tile");
    let untouched = *tile.image.get_pixel(120, 66);
    let shaded = *tile.image.get_pixel(20, 120);
    assert_eq!(untouched, Rgba([40, 80, 160, 255]));
    assert!(shaded[2] < untouched[2]);
}

#[test]
fn test_broken_icon_fails_the_tile() {
    let mut broken = art("Broken", [true; 9]);
    broken.major_icons[4].bytes = b"not an image".to_vec();
    assert!(matches!(
        render_specialization(&broken),
        Err(RenderError::Image(_))
    ));

    let mut tiny = art("Tiny", [true; 9]);
    tiny.minor_icons[0] = png(6, 6, [0, 0, 0, 255]);
    assert!(matches!(
        render_specialization(&tiny),
        Err(RenderError::IconTooSmall { .. })
    ));
}

#[test]
fn test_three_tiles_stack_to_three_heights() {
    let composer = TraitlineComposer::default();
    let arts = vec![
        art("Strength", [true; 9]),
        art("Tactics", [false; 9]),
        art("Berserker", [true; 9]),
    ];
    let png = composer.compose(&arts).expect("composite");
    let image = image::load_from_memory(&png).expect("decode output");
    assert_eq!(image.width(), TILE_WIDTH);
    assert_eq!(image.height(), TILE_HEIGHT * 3);

    assert!(matches!(
        composer.compose(&[]),
        Err(RenderError::NothingToRender)
    ));
}

// endregion:  --- Images

// region:  --- Traitlines

struct MemoryImages {
    images: HashMap<String, Vec<u8>>,
    delay: Option<Duration>,
}

impl ImageSource for MemoryImages {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn specialization_doc(id: u32, name: &str) -> Value {
    let base = id * 100;
    json!({
        "id": id,
        "name": name,
        "background": format!("bg/{id}"),
        "minor_traits": [base, base + 1, base + 2],
        "major_traits": (3..12).map(|n| base + n).collect::<Vec<_>>()
    })
}

fn trait_docs(id: u32) -> Vec<Value> {
    let base = id * 100;
    (0..12)
        .map(|n| json!({"id": base + n, "name": format!("Trait {}", base + n), "icon": format!("icon/{}", base + n)}))
        .collect()
}

fn fixtures(delay: Option<Duration>) -> (JsonCatalog, MemoryImages) {
    let mut traits = trait_docs(1);
    traits.extend(trait_docs(2));
    let catalog = JsonCatalog::new(
        vec![],
        traits,
        vec![specialization_doc(1, "Zeal"), specialization_doc(2, "Radiance")],
    );

    let mut images = HashMap::new();
    for id in [1, 2] {
        images.insert(format!("bg/{id}"), png(645, 256, [60, 60, 60, 255]));
        for n in 0..12 {
            images.insert(format!("icon/{}", id * 100 + n), png(64, 64, [220, 220, 220, 255]));
        }
    }
    (catalog, MemoryImages { images, delay })
}

fn character() -> Character {
    serde_json::from_value(json!({
        "name": "Test Guardian",
        "profession": "Guardian",
        "specializations": {
            "pve": [{"id": 1, "traits": [103, 107, 111]}, null, {"id": 2, "traits": [104, null, 110]}]
        }
    }))
    .expect("valid character")
}

#[tokio::test]
async fn test_traitlines_skip_empty_slots() {
    let (catalog, images) = fixtures(None);
    let png = render_traitlines(
        &catalog,
        &images,
        &TraitlineComposer::default(),
        &character(),
        GameMode::Pve,
        Duration::from_secs(5),
    )
    .await
    .expect("render traitlines");

    let image = image::load_from_memory(&png).expect("decode output");
    assert_eq!(image.height(), TILE_HEIGHT * 2);
}

#[tokio::test]
async fn test_traitlines_with_no_lines_render_nothing() {
    let (catalog, images) = fixtures(None);
    let result = render_traitlines(
        &catalog,
        &images,
        &TraitlineComposer::default(),
        &character(),
        GameMode::Wvw,
        Duration::from_secs(5),
    )
    .await;
    assert!(matches!(result, Err(RenderError::NothingToRender)));
}

#[tokio::test]
async fn test_slow_icon_fails_whole_render() {
    let (catalog, images) = fixtures(Some(Duration::from_millis(200)));
    let result = render_traitlines(
        &catalog,
        &images,
        &TraitlineComposer::default(),
        &character(),
        GameMode::Pve,
        Duration::from_millis(20),
    )
    .await;
    assert!(matches!(result, Err(RenderError::FetchTimeout(_))));
}

#[tokio::test]
async fn test_missing_icon_fails_whole_render() {
    let (catalog, mut images) = fixtures(None);
    images.images.remove("icon/205");
    let result = render_traitlines(
        &catalog,
        &images,
        &TraitlineComposer::default(),
        &character(),
        GameMode::Pve,
        Duration::from_secs(5),
    )
    .await;
    assert!(matches!(
        result,
        Err(RenderError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_trait_facts_do_not_block_traitlines() {
    let mut traits = trait_docs(1);
    traits.extend(trait_docs(2));
    traits[4]["facts"] = json!([{"type": "Shadowstep", "value": 1}]);
    let (_, images) = fixtures(None);
    let catalog = JsonCatalog::new(
        vec![],
        traits,
        vec![specialization_doc(1, "Zeal"), specialization_doc(2, "Radiance")],
    );

    let png = render_traitlines(
        &catalog,
        &images,
        &TraitlineComposer::default(),
        &character(),
        GameMode::Pve,
        Duration::from_secs(5),
    )
    .await
    .expect("render traitlines");
    let image = image::load_from_memory(&png).expect("decode output");
    assert_eq!(image.height(), TILE_HEIGHT * 2);
}

// endregion:  --- Traitlines

#[tokio::test]
async fn test_unknown_fact_type_aborts_the_skill() {
    let catalog = JsonCatalog::new(
        vec![
            json!({"id": 1, "name": "Fine", "professions": ["Thief"], "facts": [{"type": "Recharge", "value": 3}]}),
            json!({"id": 2, "name": "Broken", "professions": ["Thief"], "facts": [{"type": "Shadowstep", "value": 3}]}),
        ],
        vec![],
        vec![],
    );

    assert!(catalog.skill(1).await.is_ok());
    match catalog.skill(2).await {
        Err(RenderError::UnknownFactType(tag)) => assert_eq!(tag, "Shadowstep"),
        other => panic!("expected an unknown fact type, got {other:?}"),
    }
}
