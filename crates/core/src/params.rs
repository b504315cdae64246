//! Request-parameter normalization.
//!
//! Turns structured generation inputs into the flat option mapping the
//! generation service accepts. Dependent options (weights, versions) are
//! only emitted together with the option they qualify, and image-valued
//! references are staged to files through an [`ImageStager`] before they
//! enter the mapping.

use image::RgbImage;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::options::{
    validate_style_version, PersonalizeMode, Quality, SpeedMode, Visibility,
};

/// Flat option name → value mapping sent with a job.
pub type RequestParams = Map<String, Value>;

/* --------------------------------------------------------------------------
   Parameter keys
   -------------------------------------------------------------------------- */

pub const KEY_AR: &str = "ar";
pub const KEY_STYLIZE: &str = "stylize";
pub const KEY_CHAOS: &str = "chaos";
pub const KEY_WEIRD: &str = "weird";
pub const KEY_SEED: &str = "seed";
pub const KEY_QUALITY: &str = "quality";
pub const KEY_RAW: &str = "raw";
pub const KEY_TILE: &str = "tile";
pub const KEY_DRAFT: &str = "draft";
pub const KEY_MODE: &str = "mode";
pub const KEY_VISIBILITY: &str = "visibility";
pub const KEY_PERSONALIZE: &str = "personalize";
pub const KEY_IMAGE: &str = "image";
pub const KEY_IMAGE_WEIGHT: &str = "iw";
pub const KEY_STYLE_REF: &str = "sref";
pub const KEY_STYLE_WEIGHT: &str = "sw";
pub const KEY_STYLE_VERSION: &str = "sv";
pub const KEY_OMNI_REF: &str = "oref";
pub const KEY_OMNI_WEIGHT: &str = "ow";
pub const KEY_NO: &str = "no";

/* --------------------------------------------------------------------------
   Input bounds
   -------------------------------------------------------------------------- */

pub const AR_RANGE: (u32, u32) = (1, 21);
pub const STYLIZE_RANGE: (u32, u32) = (0, 1000);
pub const CHAOS_RANGE: (u32, u32) = (0, 100);
pub const WEIRD_RANGE: (u32, u32) = (0, 3000);
pub const STYLE_WEIGHT_RANGE: (u32, u32) = (0, 1000);
pub const OMNI_WEIGHT_RANGE: (u32, u32) = (1, 1000);
pub const IMAGE_WEIGHT_RANGE: (f64, f64) = (0.0, 3.0);

/* --------------------------------------------------------------------------
   References
   -------------------------------------------------------------------------- */

/// A style or omni reference: either pixel data or a textual code/URL.
#[derive(Debug, Clone)]
pub enum Reference {
    Image(RgbImage),
    Text(String),
}

impl Reference {
    /// A textual reference with no content counts as absent.
    pub fn is_empty(&self) -> bool {
        matches!(self, Reference::Text(s) if s.is_empty())
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Reference::Text(s.to_string())
    }
}

impl From<String> for Reference {
    fn from(s: String) -> Self {
        Reference::Text(s)
    }
}

impl From<RgbImage> for Reference {
    fn from(img: RgbImage) -> Self {
        Reference::Image(img)
    }
}

/// Writes in-memory images somewhere the service client can upload from
/// and returns the resulting path string.
pub trait ImageStager {
    fn stage(&self, image: &RgbImage) -> Result<String, CoreError>;
}

/* --------------------------------------------------------------------------
   Structured input
   -------------------------------------------------------------------------- */

/// Structured generation parameters as a caller fills them in.
///
/// [`Default`] matches the defaults of the parameter node: 1:1, stylize
/// 100, everything else off.
#[derive(Debug, Clone)]
pub struct ImagineParamsInput {
    pub ar_w: u32,
    pub ar_h: u32,
    pub stylize: u32,
    pub chaos: u32,
    pub weird: u32,
    pub seed: u64,
    pub quality: Quality,
    pub raw: bool,
    pub tile: bool,
    pub draft: bool,
    pub mode: SpeedMode,
    pub visibility: Visibility,
    pub personalize: PersonalizeMode,
    pub personalize_code: String,
    /// Image prompt.
    pub image: Option<RgbImage>,
    pub iw: Option<f64>,
    pub sref: Option<Reference>,
    pub sw: Option<u32>,
    /// Style version; only meaningful for a textual `sref`.
    pub sv: Option<String>,
    pub oref: Option<Reference>,
    pub ow: Option<u32>,
}

impl Default for ImagineParamsInput {
    fn default() -> Self {
        Self {
            ar_w: 1,
            ar_h: 1,
            stylize: 100,
            chaos: 0,
            weird: 0,
            seed: 0,
            quality: Quality::default(),
            raw: false,
            tile: false,
            draft: false,
            mode: SpeedMode::default(),
            visibility: Visibility::default(),
            personalize: PersonalizeMode::default(),
            personalize_code: String::new(),
            image: None,
            iw: None,
            sref: None,
            sw: None,
            sv: None,
            oref: None,
            ow: None,
        }
    }
}

impl ImagineParamsInput {
    /// Build the flat option mapping.
    ///
    /// All validation happens before the first image is staged, so an
    /// invalid input never leaves temp files behind.
    pub fn normalize(&self, stager: &dyn ImageStager) -> Result<RequestParams, CoreError> {
        self.validate()?;

        let mut params = RequestParams::new();
        params.insert(KEY_AR.into(), Value::from(format!("{}:{}", self.ar_w, self.ar_h)));
        params.insert(KEY_STYLIZE.into(), Value::from(self.stylize));
        params.insert(KEY_CHAOS.into(), Value::from(self.chaos));
        params.insert(KEY_WEIRD.into(), Value::from(self.weird));
        params.insert(KEY_SEED.into(), Value::from(self.seed));
        params.insert(KEY_QUALITY.into(), Value::from(self.quality.value()));
        params.insert(KEY_RAW.into(), Value::from(self.raw));
        params.insert(KEY_TILE.into(), Value::from(self.tile));
        params.insert(KEY_DRAFT.into(), Value::from(self.draft));
        params.insert(KEY_MODE.into(), Value::from(self.mode.as_str()));

        if self.visibility != Visibility::Default {
            params.insert(KEY_VISIBILITY.into(), Value::from(self.visibility.as_str()));
        }

        if let Some(image) = &self.image {
            params.insert(KEY_IMAGE.into(), Value::from(stager.stage(image)?));
            if let Some(iw) = self.iw {
                params.insert(KEY_IMAGE_WEIGHT.into(), Value::from(iw));
            }
        }

        if let Some(sref) = self.sref.as_ref().filter(|r| !r.is_empty()) {
            match sref {
                Reference::Image(img) => {
                    params.insert(KEY_STYLE_REF.into(), Value::from(stager.stage(img)?));
                }
                Reference::Text(code) => {
                    params.insert(KEY_STYLE_REF.into(), Value::from(code.as_str()));
                    if let Some(sv) = self.style_version() {
                        params.insert(KEY_STYLE_VERSION.into(), Value::from(sv));
                    }
                }
            }
            if let Some(sw) = self.sw {
                params.insert(KEY_STYLE_WEIGHT.into(), Value::from(sw));
            }
        }

        if let Some(oref) = self.oref.as_ref().filter(|r| !r.is_empty()) {
            let value = match oref {
                Reference::Image(img) => stager.stage(img)?,
                Reference::Text(url) => url.clone(),
            };
            params.insert(KEY_OMNI_REF.into(), Value::from(value));
            if let Some(ow) = self.ow {
                params.insert(KEY_OMNI_WEIGHT.into(), Value::from(ow));
            }
        }

        match self.personalize {
            PersonalizeMode::Off => {}
            PersonalizeMode::Default => {
                params.insert(KEY_PERSONALIZE.into(), Value::from(""));
            }
            PersonalizeMode::Custom => {
                if !self.personalize_code.is_empty() {
                    params.insert(
                        KEY_PERSONALIZE.into(),
                        Value::from(self.personalize_code.as_str()),
                    );
                }
            }
        }

        Ok(params)
    }

    /// Check numeric bounds and the style version allow-list.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("ar_w", self.ar_w, AR_RANGE)?;
        check_range("ar_h", self.ar_h, AR_RANGE)?;
        check_range(KEY_STYLIZE, self.stylize, STYLIZE_RANGE)?;
        check_range(KEY_CHAOS, self.chaos, CHAOS_RANGE)?;
        check_range(KEY_WEIRD, self.weird, WEIRD_RANGE)?;
        if self.seed > u64::from(u32::MAX) {
            return Err(CoreError::Validation(format!(
                "seed must be between 0 and {}, got {}",
                u32::MAX,
                self.seed
            )));
        }
        if let Some(iw) = self.iw {
            if !(IMAGE_WEIGHT_RANGE.0..=IMAGE_WEIGHT_RANGE.1).contains(&iw) {
                return Err(CoreError::Validation(format!(
                    "iw must be between {} and {}, got {iw}",
                    IMAGE_WEIGHT_RANGE.0, IMAGE_WEIGHT_RANGE.1
                )));
            }
        }
        if let Some(sw) = self.sw {
            check_range(KEY_STYLE_WEIGHT, sw, STYLE_WEIGHT_RANGE)?;
        }
        if let Some(ow) = self.ow {
            check_range(KEY_OMNI_WEIGHT, ow, OMNI_WEIGHT_RANGE)?;
        }
        if matches!(&self.sref, Some(Reference::Text(code)) if !code.is_empty()) {
            if let Some(sv) = self.style_version() {
                validate_style_version(sv)?;
            }
        }
        Ok(())
    }

    /// Non-empty style version, if any.
    fn style_version(&self) -> Option<&str> {
        self.sv.as_deref().filter(|v| !v.is_empty())
    }
}

fn check_range(name: &str, value: u32, (min, max): (u32, u32)) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Remove and return the speed mode from a parameter map, defaulting to
/// [`SpeedMode::Fast`] when absent.
pub fn take_mode(params: &mut RequestParams) -> Result<SpeedMode, CoreError> {
    match params.remove(KEY_MODE) {
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(CoreError::Validation(format!(
            "mode must be a string, got {other}"
        ))),
        None => Ok(SpeedMode::default()),
    }
}

/// Remove the visibility entry and report whether it asked for stealth.
pub fn take_stealth(params: &mut RequestParams) -> bool {
    matches!(params.remove(KEY_VISIBILITY), Some(Value::String(s)) if s == Visibility::Stealth.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    /// Stager that hands out predictable paths and counts calls.
    #[derive(Default)]
    struct FakeStager {
        calls: Cell<usize>,
    }

    impl ImageStager for FakeStager {
        fn stage(&self, _image: &RgbImage) -> Result<String, CoreError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            Ok(format!("/tmp/mj_img_{n}.png"))
        }
    }

    fn tiny_image() -> RgbImage {
        RgbImage::new(2, 2)
    }

    #[test]
    fn defaults_produce_base_options_only() {
        let params = ImagineParamsInput::default()
            .normalize(&FakeStager::default())
            .unwrap();
        assert_eq!(
            Value::Object(params),
            json!({
                "ar": "1:1",
                "stylize": 100,
                "chaos": 0,
                "weird": 0,
                "seed": 0,
                "quality": 1,
                "raw": false,
                "tile": false,
                "draft": false,
                "mode": "fast",
            })
        );
    }

    #[test]
    fn aspect_ratio_joined_as_w_colon_h() {
        let input = ImagineParamsInput { ar_w: 16, ar_h: 9, ..Default::default() };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert_eq!(params[KEY_AR], json!("16:9"));
    }

    #[test]
    fn visibility_default_is_never_sent() {
        let params = ImagineParamsInput::default()
            .normalize(&FakeStager::default())
            .unwrap();
        assert!(!params.contains_key(KEY_VISIBILITY));

        let input = ImagineParamsInput { visibility: Visibility::Stealth, ..Default::default() };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert_eq!(params[KEY_VISIBILITY], json!("stealth"));
    }

    #[test]
    fn empty_reference_drops_weight() {
        let input = ImagineParamsInput {
            sref: Some(Reference::from("")),
            sw: Some(5),
            ..Default::default()
        };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert!(!params.contains_key(KEY_STYLE_REF));
        assert!(!params.contains_key(KEY_STYLE_WEIGHT));
    }

    #[test]
    fn absent_omni_reference_drops_weight() {
        let input = ImagineParamsInput { ow: Some(100), ..Default::default() };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert!(!params.contains_key(KEY_OMNI_REF));
        assert!(!params.contains_key(KEY_OMNI_WEIGHT));
    }

    #[test]
    fn text_reference_passes_through_with_weight_and_version() {
        let input = ImagineParamsInput {
            sref: Some(Reference::from("12345")),
            sw: Some(250),
            sv: Some("6".into()),
            ..Default::default()
        };
        let stager = FakeStager::default();
        let params = input.normalize(&stager).unwrap();
        assert_eq!(params[KEY_STYLE_REF], json!("12345"));
        assert_eq!(params[KEY_STYLE_WEIGHT], json!(250));
        assert_eq!(params[KEY_STYLE_VERSION], json!("6"));
        assert_eq!(stager.calls.get(), 0);
    }

    #[test]
    fn image_reference_is_staged_and_drops_version() {
        let input = ImagineParamsInput {
            sref: Some(Reference::Image(tiny_image())),
            sw: Some(100),
            sv: Some("6".into()),
            ..Default::default()
        };
        let stager = FakeStager::default();
        let params = input.normalize(&stager).unwrap();
        assert_eq!(params[KEY_STYLE_REF], json!("/tmp/mj_img_0.png"));
        assert_eq!(params[KEY_STYLE_WEIGHT], json!(100));
        assert!(!params.contains_key(KEY_STYLE_VERSION));
        assert_eq!(stager.calls.get(), 1);
    }

    #[test]
    fn image_reference_ignores_invalid_version() {
        let input = ImagineParamsInput {
            sref: Some(Reference::Image(tiny_image())),
            sv: Some("8".into()),
            ..Default::default()
        };
        assert!(input.normalize(&FakeStager::default()).is_ok());
    }

    #[test]
    fn invalid_version_on_text_reference_fails_before_staging() {
        let input = ImagineParamsInput {
            image: Some(tiny_image()),
            sref: Some(Reference::from("abc")),
            sv: Some("8".into()),
            ..Default::default()
        };
        let stager = FakeStager::default();
        assert_matches!(input.normalize(&stager), Err(CoreError::Validation(_)));
        assert_eq!(stager.calls.get(), 0);
    }

    #[test]
    fn omni_reference_image_and_text() {
        let input = ImagineParamsInput {
            oref: Some(Reference::Image(tiny_image())),
            ow: Some(400),
            ..Default::default()
        };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert_eq!(params[KEY_OMNI_REF], json!("/tmp/mj_img_0.png"));
        assert_eq!(params[KEY_OMNI_WEIGHT], json!(400));

        let input = ImagineParamsInput {
            oref: Some(Reference::from("https://example.com/a.png")),
            ..Default::default()
        };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert_eq!(params[KEY_OMNI_REF], json!("https://example.com/a.png"));
        assert!(!params.contains_key(KEY_OMNI_WEIGHT));
    }

    #[test]
    fn image_weight_only_with_image() {
        let input = ImagineParamsInput { iw: Some(1.5), ..Default::default() };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert!(!params.contains_key(KEY_IMAGE_WEIGHT));

        let input = ImagineParamsInput {
            image: Some(tiny_image()),
            iw: Some(1.5),
            ..Default::default()
        };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert_eq!(params[KEY_IMAGE], json!("/tmp/mj_img_0.png"));
        assert_eq!(params[KEY_IMAGE_WEIGHT], json!(1.5));
    }

    #[test]
    fn personalize_three_states() {
        let stager = FakeStager::default();

        let off = ImagineParamsInput {
            personalize: PersonalizeMode::Off,
            personalize_code: "abc".into(),
            ..Default::default()
        };
        assert!(!off.normalize(&stager).unwrap().contains_key(KEY_PERSONALIZE));

        let default = ImagineParamsInput {
            personalize: PersonalizeMode::Default,
            ..Default::default()
        };
        assert_eq!(default.normalize(&stager).unwrap()[KEY_PERSONALIZE], json!(""));

        let custom = ImagineParamsInput {
            personalize: PersonalizeMode::Custom,
            personalize_code: "xyz".into(),
            ..Default::default()
        };
        assert_eq!(custom.normalize(&stager).unwrap()[KEY_PERSONALIZE], json!("xyz"));
    }

    #[test]
    fn custom_personalize_with_empty_code_is_omitted() {
        let input = ImagineParamsInput {
            personalize: PersonalizeMode::Custom,
            personalize_code: String::new(),
            ..Default::default()
        };
        let params = input.normalize(&FakeStager::default()).unwrap();
        assert!(!params.contains_key(KEY_PERSONALIZE));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let cases = [
            ImagineParamsInput { ar_w: 0, ..Default::default() },
            ImagineParamsInput { ar_h: 22, ..Default::default() },
            ImagineParamsInput { stylize: 1001, ..Default::default() },
            ImagineParamsInput { chaos: 101, ..Default::default() },
            ImagineParamsInput { weird: 3001, ..Default::default() },
            ImagineParamsInput { seed: u64::from(u32::MAX) + 1, ..Default::default() },
            ImagineParamsInput { iw: Some(3.5), ..Default::default() },
            ImagineParamsInput { ow: Some(0), ..Default::default() },
        ];
        for input in cases {
            assert_matches!(
                input.normalize(&FakeStager::default()),
                Err(CoreError::Validation(_))
            );
        }
    }

    #[test]
    fn take_mode_pops_and_defaults() {
        let mut params = RequestParams::new();
        params.insert(KEY_MODE.into(), json!("relax"));
        params.insert(KEY_STYLIZE.into(), json!(50));
        assert_eq!(take_mode(&mut params).unwrap(), SpeedMode::Relax);
        assert!(!params.contains_key(KEY_MODE));
        assert_eq!(take_mode(&mut params).unwrap(), SpeedMode::Fast);
    }

    #[test]
    fn take_mode_rejects_unknown_value() {
        let mut params = RequestParams::new();
        params.insert(KEY_MODE.into(), json!("warp"));
        assert_matches!(take_mode(&mut params), Err(CoreError::Validation(_)));
    }

    #[test]
    fn take_stealth_only_for_stealth() {
        let mut params = RequestParams::new();
        params.insert(KEY_VISIBILITY.into(), json!("stealth"));
        assert!(take_stealth(&mut params));
        assert!(!params.contains_key(KEY_VISIBILITY));

        params.insert(KEY_VISIBILITY.into(), json!("public"));
        assert!(!take_stealth(&mut params));
        assert!(!take_stealth(&mut params));
    }
}
