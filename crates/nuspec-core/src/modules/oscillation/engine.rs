use crate::common::constants::{DEFAULT_ELECTRON_FRACTION, EV_SQ_KM_TO_GEV_OVER4, YE_RHO_E_TO_A};
use crate::domain::{
    ComputeResult, FLAVOR_COUNT, Flavor, NuSpecError, OscillationParameters, ParticleSign,
};

/// `matrix[a][b]` is P(ν_a → ν_b) with rows and columns in e, mu, tau order.
pub type ProbabilityMatrix = [[f64; FLAVOR_COUNT]; FLAVOR_COUNT];

/// One propagation query. The matter sign only fixes the sign of the matter
/// potential; it defaults to the sign of `initial`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationRequest {
    pub energy_gev: f64,
    pub initial: Flavor,
    pub detected: Flavor,
    pub matter_sign: ParticleSign,
}

impl PropagationRequest {
    pub fn new(initial: Flavor, detected: Flavor, energy_gev: f64) -> Self {
        Self {
            energy_gev,
            initial,
            detected,
            matter_sign: initial.particle_sign(),
        }
    }

    pub fn with_matter_sign(mut self, matter_sign: ParticleSign) -> Self {
        self.matter_sign = matter_sign;
        self
    }
}

pub trait OscillationEngine {
    fn probability(
        &self,
        params: &OscillationParameters,
        request: &PropagationRequest,
    ) -> ComputeResult<f64>;
}

/// Three-flavor oscillation through constant-density matter using the
/// Denton-Minakata-Parke eigenvalue approximation, optionally refined by
/// Newton iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmpEngine {
    pub electron_fraction: f64,
    pub newton_iterations: u8,
}

impl Default for DmpEngine {
    fn default() -> Self {
        Self {
            electron_fraction: DEFAULT_ELECTRON_FRACTION,
            newton_iterations: 0,
        }
    }
}

impl DmpEngine {
    pub fn with_newton_iterations(mut self, newton_iterations: u8) -> Self {
        self.newton_iterations = newton_iterations;
        self
    }

    /// Full probability matrix for one energy. Antineutrinos flip the CP
    /// phase; an antineutrino matter sign flips the matter potential.
    /// Non-positive energies return the identity.
    pub fn probability_matrix(
        &self,
        params: &OscillationParameters,
        energy_gev: f64,
        particle: ParticleSign,
        matter_sign: ParticleSign,
    ) -> ProbabilityMatrix {
        if energy_gev <= 0.0 || params.baseline_km == 0.0 {
            return identity();
        }

        let s12sq = params.sin2_theta12;
        let s13sq = params.sin2_theta13;
        let s23sq = params.sin2_theta23;
        let dmsq21 = params.delta_m21_sq;
        let dmsq31 = params.delta_m31_sq;
        let delta = params.delta_cp * f64::from(particle.sign());
        let matter_potential = self.electron_fraction
            * params.density_g_cm3
            * energy_gev
            * YE_RHO_E_TO_A
            * f64::from(matter_sign.sign());

        let c13sq = 1.0 - s13sq;

        let ue2sq = c13sq * s12sq;
        let ue3sq = s13sq;
        let um3sq = c13sq * s23sq;
        let ut2sq = s13sq * s12sq * s23sq;
        let um2sq = (1.0 - s12sq) * (1.0 - s23sq);

        let jrr = (um2sq * ut2sq).sqrt();
        let um2sq = um2sq + ut2sq - 2.0 * jrr * delta.cos();
        let jarlskog = 8.0 * jrr * c13sq * delta.sin();
        let dmsqee = dmsq31 - s12sq * dmsq21;

        let a_sum = dmsq21 + dmsq31;
        let see = a_sum - dmsq21 * ue2sq - dmsq31 * ue3sq;
        let tmm_base = dmsq21 * dmsq31;
        let tee = tmm_base * (1.0 - ue3sq - ue2sq);
        let c = matter_potential * tee;
        let a = a_sum + matter_potential;

        // lambda3 from the DMP lambda+ estimate
        let xmat = matter_potential / dmsqee;
        let tmp = 1.0 - xmat;
        let mut lambda3 =
            dmsq31 + 0.5 * dmsqee * (xmat - 1.0 + (tmp * tmp + 4.0 * s13sq * xmat).sqrt());

        let b = tmm_base + matter_potential * see;
        for _ in 0..self.newton_iterations {
            lambda3 = (lambda3 * lambda3 * (lambda3 - a) + c) / (lambda3 * (2.0 * lambda3 - a) + b);
        }

        let tmp = a - lambda3;
        let dlambda21 = (tmp * tmp - 4.0 * c / lambda3).sqrt();
        let lambda2 = 0.5 * (a - lambda3 + dlambda21);
        let dlambda32 = lambda3 - lambda2;
        let dlambda31 = dlambda32 + dlambda21;

        // Eigenvector-eigenvalue identity for the matter mixing elements.
        let pi_dlambda_inv = 1.0 / (dlambda31 * dlambda32 * dlambda21);
        let xp3 = pi_dlambda_inv * dlambda21;
        let xp2 = -pi_dlambda_inv * dlambda31;

        let ue3sq = (lambda3 * (lambda3 - see) + tee) * xp3;
        let ue2sq = (lambda2 * (lambda2 - see) + tee) * xp2;

        let smm = a - dmsq21 * um2sq - dmsq31 * um3sq;
        let tmm = tmm_base * (1.0 - um3sq - um2sq) + matter_potential * (see + smm - a_sum);

        let um3sq = (lambda3 * (lambda3 - smm) + tmm) * xp3;
        let um2sq = (lambda2 * (lambda2 - smm) + tmm) * xp2;

        let jarlskog = jarlskog * dmsq21 * dmsq31 * (dmsq31 - dmsq21) * pi_dlambda_inv;

        let ue1sq = 1.0 - ue3sq - ue2sq;
        let um1sq = 1.0 - um3sq - um2sq;
        let ut3sq = 1.0 - um3sq - ue3sq;
        let ut2sq = 1.0 - um2sq - ue2sq;
        let ut1sq = 1.0 - um1sq - ue1sq;

        let l_over_4e = EV_SQ_KM_TO_GEV_OVER4 * params.baseline_km / energy_gev;
        let d21 = dlambda21 * l_over_4e;
        let d32 = dlambda32 * l_over_4e;

        let sin_d21 = d21.sin();
        let sin_d31 = (d32 + d21).sin();
        let sin_d32 = d32.sin();
        let triple_sin = sin_d21 * sin_d31 * sin_d32;

        let sinsq_d21 = 2.0 * sin_d21 * sin_d21;
        let sinsq_d31 = 2.0 * sin_d31 * sin_d31;
        let sinsq_d32 = 2.0 * sin_d32 * sin_d32;

        let pme_cpc = (ut3sq - um2sq * ue1sq - um1sq * ue2sq) * sinsq_d21
            + (ut2sq - um3sq * ue1sq - um1sq * ue3sq) * sinsq_d31
            + (ut1sq - um3sq * ue2sq - um2sq * ue3sq) * sinsq_d32;
        let pme_cpv = -jarlskog * triple_sin;

        let pmm = 1.0
            - 2.0
                * (um2sq * um1sq * sinsq_d21
                    + um3sq * um1sq * sinsq_d31
                    + um3sq * um2sq * sinsq_d32);
        let pee = 1.0
            - 2.0
                * (ue2sq * ue1sq * sinsq_d21
                    + ue3sq * ue1sq * sinsq_d31
                    + ue3sq * ue2sq * sinsq_d32);

        let mut probs = [[0.0; FLAVOR_COUNT]; FLAVOR_COUNT];
        probs[0][0] = pee;
        probs[0][1] = pme_cpc - pme_cpv;
        probs[0][2] = 1.0 - pee - probs[0][1];

        probs[1][0] = pme_cpc + pme_cpv;
        probs[1][1] = pmm;
        probs[1][2] = 1.0 - probs[1][0] - pmm;

        probs[2][0] = 1.0 - pee - probs[1][0];
        probs[2][1] = 1.0 - probs[0][1] - pmm;
        probs[2][2] = 1.0 - probs[0][2] - probs[1][2];

        probs
    }
}

fn identity() -> ProbabilityMatrix {
    let mut probs = [[0.0; FLAVOR_COUNT]; FLAVOR_COUNT];
    for (index, row) in probs.iter_mut().enumerate() {
        row[index] = 1.0;
    }
    probs
}

impl OscillationEngine for DmpEngine {
    fn probability(
        &self,
        params: &OscillationParameters,
        request: &PropagationRequest,
    ) -> ComputeResult<f64> {
        let matrix = self.probability_matrix(
            params,
            request.energy_gev,
            request.initial.particle_sign(),
            request.matter_sign,
        );
        let value = matrix[request.initial.kind().position()][request.detected.kind().position()];
        if !value.is_finite() {
            return Err(NuSpecError::internal(
                "OSC.NON_FINITE_PROBABILITY",
                format!(
                    "P({} -> {}) at {} GeV is not finite",
                    request.initial, request.detected, request.energy_gev
                ),
            ));
        }
        Ok(value)
    }
}
