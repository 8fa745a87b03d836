use serde::{Deserialize, Serialize};

/// Declarative description of one payment method offered through the gateway.
///
/// Every variant runs through the same processor; this record is all that differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub display_name: String,
    /// Code the gateway expects in the `gateway` field, e.g. `FIETSENBON`.
    pub gateway_code: String,
    pub icon_asset: String,
    pub settings_template: String,
    #[serde(default = "default_checkout_template")]
    pub checkout_template: String,
    /// Settings that must be present before the method is offered.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Skip the settings check entirely.
    #[serde(default)]
    pub always_configured: bool,
    /// Supports the direct sub-mode with bank account and date of birth.
    #[serde(default)]
    pub direct_debit: bool,
}

fn default_checkout_template() -> String {
    "checkout/gateway.html".to_string()
}

impl VariantDescriptor {
    fn voucher(display_name: &str, gateway_code: &str) -> Self {
        let slug = gateway_code.to_ascii_lowercase();
        Self {
            display_name: display_name.to_string(),
            gateway_code: gateway_code.to_string(),
            icon_asset: format!("msp_{slug}.png"),
            settings_template: format!("{slug}/config.html"),
            checkout_template: default_checkout_template(),
            required_fields: Vec::new(),
            always_configured: true,
            direct_debit: false,
        }
    }

    /// URL-safe identifier used in routes and config overrides.
    pub fn slug(&self) -> String {
        self.gateway_code.to_ascii_lowercase()
    }

    /// Template for the extra checkout fields of the direct sub-mode.
    pub fn input_template(&self) -> Option<String> {
        self.direct_debit
            .then(|| format!("{}/checkout/direct.html", self.slug()))
    }
}

/// All payment methods known to this installation.
#[derive(Debug, Clone, Default)]
pub struct VariantCatalog {
    variants: Vec<VariantDescriptor>,
}

impl VariantCatalog {
    pub fn builtin() -> Self {
        let einvoice = VariantDescriptor {
            display_name: "E-Invoice".to_string(),
            gateway_code: "EINVOICE".to_string(),
            icon_asset: "msp_einvoice.png".to_string(),
            settings_template: "einvoice/config.html".to_string(),
            checkout_template: default_checkout_template(),
            required_fields: vec!["prefix".to_string()],
            always_configured: false,
            direct_debit: true,
        };

        Self {
            variants: vec![
                einvoice,
                VariantDescriptor::voucher("Fietsenbon", "FIETSENBON"),
                VariantDescriptor::voucher("iDEAL QR", "IDEALQR"),
                VariantDescriptor::voucher("Erotiekbon", "EROTIEKBON"),
                VariantDescriptor::voucher("Webshop Giftcard", "WEBSHOPGIFTCARD"),
                VariantDescriptor::voucher("Boekenbon", "BOEKENBON"),
                VariantDescriptor::voucher("Wijncadeau", "WIJNCADEAU"),
                VariantDescriptor::voucher("Fashioncheque", "FASHIONCHEQUE"),
            ],
        }
    }

    /// Adds or replaces variants; a declared variant wins over a built-in with the same code.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = VariantDescriptor>) {
        for variant in extra {
            let slug = variant.slug();
            match self.variants.iter_mut().find(|v| v.slug() == slug) {
                Some(existing) => *existing = variant,
                None => self.variants.push(variant),
            }
        }
    }

    pub fn get(&self, slug: &str) -> Option<&VariantDescriptor> {
        self.variants
            .iter()
            .find(|v| v.gateway_code.eq_ignore_ascii_case(slug))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
