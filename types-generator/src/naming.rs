//! Public type names derived from fully-qualified schema names.

use parser::{Enum, Message};

use crate::Config;

/// Joins the segments of `full_name` (`.pkg.Outer.Inner` -> `pkgOuterInner`)
/// and, unless `always_qualify` is set, drops the owning package's segments.
///
/// The package is only stripped at a segment boundary, so a name that has
/// already been qualified comes back unchanged.
///
/// Declarations and references to the same entity go through this function
/// with the same arguments, so both sides always agree on the name.
pub fn qualify(full_name: &str, package: Option<&str>, always_qualify: bool) -> String {
    let local = match package {
        Some(package) if !always_qualify => full_name
            .strip_prefix('.')
            .unwrap_or(full_name)
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(full_name),
        _ => full_name,
    };
    local.replace('.', "")
}

pub(crate) fn message_name(message: &Message, config: &Config) -> String {
    qualify(
        &message.full_name,
        message.package.as_deref(),
        config.always_qualify_type_names,
    )
}

pub(crate) fn enum_name(en: &Enum, config: &Config) -> String {
    qualify(
        &en.full_name,
        en.package.as_deref(),
        config.always_qualify_type_names,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_package_prefix() {
        assert_eq!(qualify(".shop.Order", Some("shop"), false), "Order");
        assert_eq!(qualify(".shop.Order.Line", Some("shop"), false), "OrderLine");
        assert_eq!(qualify(".me.shop.Order", Some("me.shop"), false), "Order");
    }

    #[test]
    fn always_qualify_keeps_prefix() {
        assert_eq!(qualify(".shop.Order", Some("shop"), true), "shopOrder");
        assert_eq!(qualify(".me.shop.Order", Some("me.shop"), true), "meshopOrder");
        assert_eq!(qualify(".Order", None, true), "Order");
    }

    #[test]
    fn no_package() {
        assert_eq!(qualify(".Order", None, false), "Order");
        assert_eq!(qualify(".Order.Line", None, false), "OrderLine");
    }

    #[test]
    fn requalifying_a_local_name_is_stable() {
        for (full, pkg) in [
            (".shop.Order", "shop"),
            (".a.b.Outer.Inner", "a.b"),
            (".shop.shopList", "shop"),
            (".me.shop.meshopCart", "me.shop"),
        ] {
            let once = qualify(full, Some(pkg), false);
            assert_eq!(qualify(&once, Some(pkg), false), once);
        }
    }

    #[test]
    fn package_is_stripped_only_at_a_segment_boundary() {
        assert_eq!(qualify(".shop.shopList", Some("shop"), false), "shopList");
        assert_eq!(qualify(".shopping.Cart", Some("shop"), false), "shoppingCart");
        assert_eq!(qualify("shopList", Some("shop"), false), "shopList");
    }

    #[test]
    fn foreign_package_is_not_stripped() {
        assert_eq!(qualify(".billing.Invoice", Some("shop"), false), "billingInvoice");
    }
}
