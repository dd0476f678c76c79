//! Cross-section geometry
//!
//! Dimensions are in centimeters throughout, matching drawing practice for
//! concrete sections. Derived properties come out in cm²/cm⁴ and are
//! converted where the solver needs SI.

use serde::{Deserialize, Serialize};

/// Section outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SectionShape {
    /// Solid rectangle
    Rectangular {
        /// Width bw (cm)
        width: f64,
        /// Total height h (cm)
        height: f64,
    },
    /// T-shape with the flange in the top face
    TShape {
        /// Web width bw (cm)
        web_width: f64,
        /// Total height h (cm)
        height: f64,
        /// Collaborating flange width bf (cm)
        flange_width: f64,
        /// Flange thickness hf (cm)
        flange_thickness: f64,
    },
}

/// Concrete cross-section with its nominal cover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub shape: SectionShape,
    /// Nominal concrete cover to the stirrup (cm)
    pub cover: f64,
}

impl CrossSection {
    /// Rectangular section, default 2.5 cm cover
    pub fn rectangular(width: f64, height: f64) -> Self {
        Self {
            shape: SectionShape::Rectangular { width, height },
            cover: 2.5,
        }
    }

    /// T-section, default 2.5 cm cover
    pub fn t_shape(web_width: f64, height: f64, flange_width: f64, flange_thickness: f64) -> Self {
        Self {
            shape: SectionShape::TShape {
                web_width,
                height,
                flange_width,
                flange_thickness,
            },
            cover: 2.5,
        }
    }

    /// Override the nominal cover (cm)
    pub fn with_cover(mut self, cover: f64) -> Self {
        self.cover = cover;
        self
    }

    /// Total height h (cm)
    pub fn height(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { height, .. } => height,
            SectionShape::TShape { height, .. } => height,
        }
    }

    /// Web width bw (cm); the full width for rectangles
    pub fn web_width(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { width, .. } => width,
            SectionShape::TShape { web_width, .. } => web_width,
        }
    }

    /// Width of the compression block under sagging moment (cm)
    pub fn compression_width(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { width, .. } => width,
            SectionShape::TShape { flange_width, .. } => flange_width,
        }
    }

    /// Flange thickness hf (cm), if the section has one
    pub fn flange_thickness(&self) -> Option<f64> {
        match self.shape {
            SectionShape::Rectangular { .. } => None,
            SectionShape::TShape {
                flange_thickness, ..
            } => Some(flange_thickness),
        }
    }

    /// Gross area (cm²)
    pub fn area(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { width, height } => width * height,
            SectionShape::TShape {
                web_width,
                height,
                flange_width,
                flange_thickness,
            } => flange_width * flange_thickness + web_width * (height - flange_thickness),
        }
    }

    /// Centroid depth measured from the top face (cm)
    pub fn centroid_from_top(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { height, .. } => height / 2.0,
            SectionShape::TShape {
                web_width,
                height,
                flange_width,
                flange_thickness,
            } => {
                let a_f = flange_width * flange_thickness;
                let a_w = web_width * (height - flange_thickness);
                let y_f = flange_thickness / 2.0;
                let y_w = flange_thickness + (height - flange_thickness) / 2.0;
                (a_f * y_f + a_w * y_w) / (a_f + a_w)
            }
        }
    }

    /// Distance from the centroid to the tension (bottom) fiber (cm)
    pub fn yt_bottom(&self) -> f64 {
        self.height() - self.centroid_from_top()
    }

    /// Gross moment of inertia about the centroid (cm⁴)
    pub fn gross_inertia(&self) -> f64 {
        match self.shape {
            SectionShape::Rectangular { width, height } => width * height.powi(3) / 12.0,
            SectionShape::TShape {
                web_width,
                height,
                flange_width,
                flange_thickness,
            } => {
                let yc = self.centroid_from_top();
                let hw = height - flange_thickness;
                let i_f = flange_width * flange_thickness.powi(3) / 12.0;
                let i_w = web_width * hw.powi(3) / 12.0;
                let d_f = yc - flange_thickness / 2.0;
                let d_w = flange_thickness + hw / 2.0 - yc;
                i_f + flange_width * flange_thickness * d_f * d_f
                    + i_w
                    + web_width * hw * d_w * d_w
            }
        }
    }

    /// Gross inertia in m⁴, for EI products in the solver
    pub fn gross_inertia_m4(&self) -> f64 {
        self.gross_inertia() * 1e-8
    }

    /// Self weight per unit length (kN/m) for a given unit weight (kN/m³)
    pub fn self_weight_kn_m(&self, unit_weight: f64) -> f64 {
        self.area() / 1e4 * unit_weight
    }

    /// Same section with a different total height (optimizer candidates)
    pub fn with_height(&self, height: f64) -> Self {
        let shape = match self.shape {
            SectionShape::Rectangular { width, .. } => SectionShape::Rectangular { width, height },
            SectionShape::TShape {
                web_width,
                flange_width,
                flange_thickness,
                ..
            } => SectionShape::TShape {
                web_width,
                height,
                flange_width,
                flange_thickness,
            },
        };
        Self {
            shape,
            cover: self.cover,
        }
    }

    /// Geometry sanity checks
    pub fn validate(&self) -> Result<(), String> {
        let h = self.height();
        let bw = self.web_width();
        if !(h.is_finite() && bw.is_finite()) || h <= 0.0 || bw <= 0.0 {
            return Err(format!("section dimensions must be positive (bw={bw}, h={h})"));
        }
        if !self.cover.is_finite() || self.cover <= 0.0 || self.cover >= h / 2.0 {
            return Err(format!("cover {} cm is out of range for h = {} cm", self.cover, h));
        }
        if let SectionShape::TShape {
            web_width,
            height,
            flange_width,
            flange_thickness,
        } = self.shape
        {
            if flange_width < web_width {
                return Err("flange width must be at least the web width".to_string());
            }
            if flange_thickness <= 0.0 || flange_thickness >= height {
                return Err("flange thickness must lie inside the section height".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_properties() {
        let s = CrossSection::rectangular(15.0, 40.0);
        assert_relative_eq!(s.area(), 600.0);
        assert_relative_eq!(s.gross_inertia(), 15.0 * 40f64.powi(3) / 12.0);
        assert_relative_eq!(s.yt_bottom(), 20.0);
        assert_relative_eq!(s.self_weight_kn_m(25.0), 1.5);
    }

    #[test]
    fn test_t_section_centroid_above_midheight() {
        let s = CrossSection::t_shape(15.0, 50.0, 60.0, 10.0);
        // Wide top flange pulls the centroid toward the top face
        assert!(s.centroid_from_top() < 25.0);
        assert!(s.gross_inertia() > CrossSection::rectangular(15.0, 50.0).gross_inertia());
    }

    #[test]
    fn test_with_height_keeps_widths() {
        let s = CrossSection::rectangular(15.0, 40.0).with_height(55.0);
        assert_eq!(s.height(), 55.0);
        assert_eq!(s.web_width(), 15.0);
        assert_eq!(s.cover, 2.5);
    }

    #[test]
    fn test_validation_rejects_bad_flange() {
        let s = CrossSection::t_shape(20.0, 50.0, 15.0, 10.0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_cover() {
        assert!(CrossSection::rectangular(15.0, 40.0)
            .with_cover(f64::NAN)
            .validate()
            .is_err());
        assert!(CrossSection::rectangular(15.0, 40.0)
            .with_cover(25.0)
            .validate()
            .is_err());
    }
}
