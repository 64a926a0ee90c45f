// macOS implementation using the Accessibility API
//
// Every query starts from the system-wide AXUIElement and walks to the
// focused element. Requires the process to be trusted for accessibility.

use accessibility_sys::*;
use core_foundation::base::{CFGetTypeID, CFRelease, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::{CFString, CFStringRef};
use log::{debug, warn};

use crate::{meaningful_focused_text, meaningful_selection, SelectionEvent, SelectionKind, UNKNOWN_APP};

/// Attributes tried, in order, when nothing is selected
const FOCUSED_TEXT_ATTRIBUTES: [&str; 4] = [
    kAXValueAttribute,
    kAXTitleAttribute,
    kAXDescriptionAttribute,
    kAXHelpAttribute,
];

/// Owned AXUIElementRef, released on drop
struct Element(AXUIElementRef);

impl Drop for Element {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CFRelease(self.0 as CFTypeRef) };
        }
    }
}

impl Element {
    fn system_wide() -> Self {
        Element(unsafe { AXUIElementCreateSystemWide() })
    }

    /// Copy an attribute whose value is itself an AXUIElement
    fn element_attribute(&self, attribute: &str) -> Option<Element> {
        let value = self.copy_attribute(attribute)?;
        Some(Element(value as AXUIElementRef))
    }

    /// Copy an attribute and convert it to a String if it is a CFString
    fn string_attribute(&self, attribute: &str) -> Option<String> {
        let value = self.copy_attribute(attribute)?;
        unsafe {
            if CFGetTypeID(value) != CFString::type_id() {
                CFRelease(value);
                return None;
            }
            let cf_string: CFString = TCFType::wrap_under_create_rule(value as CFStringRef);
            Some(cf_string.to_string())
        }
    }

    fn copy_attribute(&self, attribute: &str) -> Option<CFTypeRef> {
        if self.0.is_null() {
            return None;
        }
        let attr = CFString::new(attribute);
        let mut value: CFTypeRef = std::ptr::null();
        let result = unsafe {
            AXUIElementCopyAttributeValue(self.0, attr.as_concrete_TypeRef(), &mut value)
        };
        if result != kAXErrorSuccess || value.is_null() {
            return None;
        }
        Some(value)
    }
}

fn focused_element() -> Option<Element> {
    let focused = Element::system_wide().element_attribute(kAXFocusedUIElementAttribute);
    if focused.is_none() {
        debug!("No focused element found");
    }
    focused
}

fn focused_app_name() -> String {
    Element::system_wide()
        .element_attribute(kAXFocusedApplicationAttribute)
        .and_then(|app| app.string_attribute(kAXTitleAttribute))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_APP.to_string())
}

pub fn selected_text() -> Option<String> {
    if !accessibility_trusted() {
        warn!("⚠️  Accessibility permissions not granted");
        return None;
    }
    focused_element()?
        .string_attribute(kAXSelectedTextAttribute)
        .and_then(meaningful_selection)
}

pub fn current_selection() -> Option<SelectionEvent> {
    let focused = focused_element()?;

    if let Some(text) = focused
        .string_attribute(kAXSelectedTextAttribute)
        .and_then(meaningful_selection)
    {
        return Some(SelectionEvent::now(text, focused_app_name(), SelectionKind::Selected));
    }

    FOCUSED_TEXT_ATTRIBUTES
        .iter()
        .find_map(|attr| focused.string_attribute(attr).and_then(meaningful_focused_text))
        .map(|text| SelectionEvent::now(text, focused_app_name(), SelectionKind::Focused))
}

pub fn accessibility_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

pub fn request_accessibility() -> Result<bool, String> {
    let prompt_key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
    let options = CFDictionary::from_CFType_pairs(&[(prompt_key, CFBoolean::true_value())]);
    let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) };
    debug!("Accessibility prompt requested, trusted={}", trusted);
    Ok(trusted)
}
