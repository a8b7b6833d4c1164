//! Actions and the pure reducer over [`RenderOptions`].

use serde::{Deserialize, Serialize};

use super::{
    BackgroundType, BarcodeFormat, CodeType, Pattern, QrErrorLevel, RenderOptions, bounds, clamp,
    clamp_width,
};
use crate::color::Color;
use crate::presets;

/// A single user edit.
///
/// JSON form: `{"type": "setQrSize", "value": 320}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Action {
    SetContent(String),
    /// Also resets `content` to the type's default when the type changes.
    SetCodeType(CodeType),
    SetBarcodeFormat(BarcodeFormat),
    SetQrErrorLevel(QrErrorLevel),
    SetWidth(f32),
    SetHeight(u32),
    SetQrSize(u32),
    SetMargin(u32),
    SetFontSize(u32),
    SetBorderRadius(u32),
    SetBackgroundType(BackgroundType),
    SetBackgroundColor(Color),
    SetGradientColor1(Color),
    SetGradientColor2(Color),
    SetGradientDirection(u32),
    SetPattern(Pattern),
    SetLineColor(Color),
    SetShadow(bool),
    SetDisplayValue(bool),
    /// Replace content with a preset template and force QR.
    ApplyPreset(String),
}

impl Action {
    /// Bring numeric payloads into bounds.
    ///
    /// Actions built by the form are already in range; this is for actions
    /// that arrive over the wire.
    pub fn clamped(self) -> Self {
        match self {
            Action::SetWidth(v) => Action::SetWidth(clamp_width(v)),
            Action::SetHeight(v) => Action::SetHeight(clamp(v, bounds::HEIGHT)),
            Action::SetQrSize(v) => Action::SetQrSize(clamp(v, bounds::QR_SIZE)),
            Action::SetMargin(v) => Action::SetMargin(clamp(v, bounds::MARGIN)),
            Action::SetFontSize(v) => Action::SetFontSize(clamp(v, bounds::FONT_SIZE)),
            Action::SetBorderRadius(v) => {
                Action::SetBorderRadius(clamp(v, bounds::BORDER_RADIUS))
            }
            Action::SetGradientDirection(v) => {
                Action::SetGradientDirection(clamp(v, bounds::GRADIENT_DIRECTION))
            }
            other => other,
        }
    }
}

/// Apply one action, returning the new options.
///
/// Every action replaces exactly one field, except:
/// - `SetCodeType` to a different type also resets `content`
/// - `ApplyPreset` sets `content` and forces `CodeType::Qr`
///
/// Unknown preset names leave the options untouched.
pub fn reduce(mut options: RenderOptions, action: Action) -> RenderOptions {
    match action {
        Action::SetContent(content) => options.content = content,
        Action::SetCodeType(code_type) => {
            if code_type != options.code_type {
                options.code_type = code_type;
                options.content = code_type.default_content().to_string();
            }
        }
        Action::SetBarcodeFormat(format) => options.barcode_format = format,
        Action::SetQrErrorLevel(level) => options.qr_error_level = level,
        Action::SetWidth(v) => options.width = v,
        Action::SetHeight(v) => options.height = v,
        Action::SetQrSize(v) => options.qr_size = v,
        Action::SetMargin(v) => options.margin = v,
        Action::SetFontSize(v) => options.font_size = v,
        Action::SetBorderRadius(v) => options.border_radius = v,
        Action::SetBackgroundType(t) => options.background_type = t,
        Action::SetBackgroundColor(c) => options.background_color = c,
        Action::SetGradientColor1(c) => options.gradient_color1 = c,
        Action::SetGradientColor2(c) => options.gradient_color2 = c,
        Action::SetGradientDirection(v) => options.gradient_direction = v,
        Action::SetPattern(p) => options.pattern = p,
        Action::SetLineColor(c) => options.line_color = c,
        Action::SetShadow(v) => options.shadow = v,
        Action::SetDisplayValue(v) => options.display_value = v,
        Action::ApplyPreset(name) => {
            if let Some(preset) = presets::find(&name) {
                options.content = preset.value.to_string();
                options.code_type = CodeType::Qr;
            }
        }
    }

    debug_assert!(
        options.in_bounds(),
        "option out of form bounds: {:?}",
        options
    );
    options
}
