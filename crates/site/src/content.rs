//! Static marketing content for the home page.
//!
//! Brands, benefits, blog teasers and contact details are fixed copy; only
//! the locator section is driven by data.

/// A featured mattress brand.
#[derive(Debug, Clone, Copy)]
pub struct Brand {
    pub name: &'static str,
    pub description: &'static str,
    pub savings: &'static str,
    /// CSS modifier for the brand's colour band.
    pub accent: &'static str,
}

pub const FEATURED_BRANDS: &[Brand] = &[
    Brand {
        name: "Sealy",
        description: "Premium comfort with Posturepedic technology",
        savings: "Up to 75% off",
        accent: "ocean",
    },
    Brand {
        name: "Serta",
        description: "Perfect sleeper collection for ultimate rest",
        savings: "Up to 80% off",
        accent: "violet",
    },
    Brand {
        name: "Tempur-Pedic",
        description: "Memory foam innovation for personalized comfort",
        savings: "Up to 70% off",
        accent: "emerald",
    },
    Brand {
        name: "Beautyrest",
        description: "Pocketed coil technology for motion isolation",
        savings: "Up to 75% off",
        accent: "sunset",
    },
    Brand {
        name: "Casper",
        description: "Modern sleep solutions with premium materials",
        savings: "Up to 65% off",
        accent: "indigo",
    },
    Brand {
        name: "Purple",
        description: "Innovative gel grid technology for cooling comfort",
        savings: "Up to 70% off",
        accent: "rose",
    },
];

/// A reason to shop at a liquidation store.
#[derive(Debug, Clone, Copy)]
pub struct Benefit {
    pub title: &'static str,
    pub description: &'static str,
}

pub const BENEFITS: &[Benefit] = &[
    Benefit {
        title: "Verified Authentic Stores",
        description: "All Store Listings are REAL Mattress Liquidators that have been verified for authenticity",
    },
    Benefit {
        title: "Fresh Inventory Weekly",
        description: "Product Inventory changes fast as new truck loads arrive weekly",
    },
    Benefit {
        title: "Premium Brand Names",
        description: "All Mattress Liquidator stores purchase factory overstocks, discontinued and slightly blemished mattress sets from major manufacturers including Sealy, Simmons, Serta, Spring Air, Beautyrest, Stearns and Foster and more",
    },
    Benefit {
        title: "Quality Assured",
        description: "Every mattress meets our high quality standards for comfort and durability",
    },
    Benefit {
        title: "Unbeatable Savings",
        description: "Save up to 80% off retail prices on premium mattresses",
    },
    Benefit {
        title: "Quick & Easy Shopping",
        description: "Find your perfect mattress fast with our streamlined store locator",
    },
];

/// Short badges under the benefits call to action.
pub const PROMISES: &[&str] = &[
    "No Hidden Fees",
    "Professional Service",
    "Best Liquidation Prices",
];

/// A teaser card linking to a sleep article.
#[derive(Debug, Clone, Copy)]
pub struct BlogTeaser {
    pub title: &'static str,
    pub excerpt: &'static str,
    pub read_minutes: u8,
}

pub const BLOG_TEASERS: &[BlogTeaser] = &[
    BlogTeaser {
        title: "What Is a Mattress Liquidator?",
        excerpt: "Overstocks, discontinued models and floor samples: where liquidation inventory comes from and why it costs so much less.",
        read_minutes: 4,
    },
    BlogTeaser {
        title: "Memory Foam or Innerspring?",
        excerpt: "How to pick the right support for the way you sleep before you walk into the store.",
        read_minutes: 6,
    },
    BlogTeaser {
        title: "Shopping a Slightly Blemished Set",
        excerpt: "Cosmetic flaws you can ignore, and the few things worth checking before you buy.",
        read_minutes: 5,
    },
];

/// How to reach the chain.
#[derive(Debug, Clone, Copy)]
pub struct ContactInfo {
    pub email: &'static str,
    pub headline: &'static str,
    pub blurb: &'static str,
}

pub const CONTACT: ContactInfo = ContactInfo {
    email: "mattresslocatorsite@gmail.com",
    headline: "Own a Mattress Liquidation Store?",
    blurb: "Get your verified location listed in the locator. Email us your store name, address and hours.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_featured_brands_are_unique() {
        let mut names: Vec<_> = FEATURED_BRANDS.iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURED_BRANDS.len());
    }

    #[test]
    fn test_benefits_have_copy() {
        assert_eq!(BENEFITS.len(), 6);
        assert!(BENEFITS.iter().all(|b| !b.description.is_empty()));
    }
}
