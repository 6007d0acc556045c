use super::consts::{AE, CK2, CK4, TOTHRD, XJ3, XKE};
use super::deep::{DeepArgs, DeepEpoch, DeepSpace};
use super::ephemeris::SelectedElements;
use super::kepler::{osculate, OrbitState, PeriodicCoefficients, SecularElements};
use super::sgp4::{drag_parameters, recover_mean_motion};

/// SDP4 model state. Unlike [`Sgp4`](super::sgp4::Sgp4) it is mutated by
/// every propagation: the resonance integrator and the lunar-solar
/// periodics cache live in [`DeepSpace`].
#[derive(Debug, Clone)]
pub struct Sdp4 {
    periodic: PeriodicCoefficients,
    xnodp: f64,
    c1: f64,
    c4: f64,
    xmdot: f64,
    omgdot: f64,
    xnodot: f64,
    xnodcf: f64,
    t2cof: f64,
    deep: DeepSpace,
}

impl Sdp4 {
    pub fn new(el: &SelectedElements) -> Self {
        let cosio = el.xincl.cos();
        let theta2 = cosio * cosio;
        let x3thm1 = 3.0 * theta2 - 1.0;
        let eosq = el.eo * el.eo;
        let betao2 = 1.0 - eosq;
        let betao = betao2.sqrt();
        let (xnodp, aodp) = recover_mean_motion(el.xno, el.eo, x3thm1);
        let (s4, qoms24) = drag_parameters(aodp, el.eo);

        let pinvsq = 1.0 / (aodp * aodp * betao2 * betao2);
        let (sing, cosg) = el.omegao.sin_cos();
        let tsi = 1.0 / (aodp - s4);
        let eta = aodp * el.eo * tsi;
        let etasq = eta * eta;
        let eeta = el.eo * eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qoms24 * tsi.powi(4);
        let coef1 = coef / psisq.powf(3.5);
        let c2 = coef1
            * xnodp
            * (aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.75 * CK2 * tsi / psisq * x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        let c1 = el.bstar * c2;
        let sinio = el.xincl.sin();
        let a3ovk2 = -XJ3 / CK2 * AE.powi(3);
        let x1mth2 = 1.0 - theta2;
        let c4 = 2.0
            * xnodp
            * coef1
            * aodp
            * betao2
            * (eta * (2.0 + 0.5 * etasq) + el.eo * (0.5 + 2.0 * etasq)
                - 2.0 * CK2 * tsi / (aodp * psisq)
                    * (-3.0 * x3thm1 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * el.omegao).cos()));
        let theta4 = theta2 * theta2;
        let temp1 = 3.0 * CK2 * pinvsq * xnodp;
        let temp2 = temp1 * CK2 * pinvsq;
        let temp3 = 1.25 * CK4 * pinvsq * pinvsq * xnodp;
        let xmdot = xnodp
            + 0.5 * temp1 * betao * x3thm1
            + 0.0625 * temp2 * betao * (13.0 - 78.0 * theta2 + 137.0 * theta4);
        let x1m5th = 1.0 - 5.0 * theta2;
        let omgdot = -0.5 * temp1 * x1m5th
            + 0.0625 * temp2 * (7.0 - 114.0 * theta2 + 395.0 * theta4)
            + temp3 * (3.0 - 36.0 * theta2 + 49.0 * theta4);
        let xhdot1 = -temp1 * cosio;
        let xnodot = xhdot1
            + (0.5 * temp2 * (4.0 - 19.0 * theta2) + 2.0 * temp3 * (3.0 - 7.0 * theta2)) * cosio;

        let deep = DeepSpace::new(
            el,
            &DeepEpoch {
                cosio,
                sinio,
                theta2,
                eosq,
                betao,
                betao2,
                sing,
                cosg,
                xnodp,
                aodp,
                xmdot,
                omgdot,
                xnodot,
            },
        );

        Sdp4 {
            periodic: PeriodicCoefficients {
                cosio,
                sinio,
                x3thm1,
                x1mth2,
                x7thm1: 7.0 * theta2 - 1.0,
                xlcof: 0.125 * a3ovk2 * sinio * (3.0 + 5.0 * cosio) / (1.0 + cosio),
                aycof: 0.25 * a3ovk2 * sinio,
            },
            xnodp,
            c1,
            c4,
            xmdot,
            omgdot,
            xnodot,
            xnodcf: 3.5 * betao2 * xhdot1 * c1,
            t2cof: 1.5 * c1,
            deep,
        }
    }

    pub fn deep_space(&self) -> &DeepSpace {
        &self.deep
    }

    /// State at `tsince` minutes from epoch.
    pub fn propagate(&mut self, el: &SelectedElements, tsince: f64) -> OrbitState {
        // Secular gravity and atmospheric drag
        let xmdf = el.xmo + self.xmdot * tsince;
        let tsq = tsince * tsince;
        let tempa = 1.0 - self.c1 * tsince;
        let tempe = el.bstar * self.c4 * tsince;
        let templ = self.t2cof * tsq;

        let mut d = DeepArgs {
            t: tsince,
            xll: xmdf,
            omgadf: el.omegao + self.omgdot * tsince,
            xnode: el.xnodeo + self.xnodot * tsince + self.xnodcf * tsq,
            xn: self.xnodp,
            ..DeepArgs::default()
        };

        self.deep.secular(el, &mut d);

        let a = (XKE / d.xn).powf(TOTHRD) * tempa * tempa;
        d.em -= tempe;
        d.xll += self.xnodp * templ;

        self.deep.periodics(&mut d);

        let secular = SecularElements {
            a,
            e: d.em,
            omega: d.omgadf,
            omgadf: d.omgadf,
            xl: d.xll + d.omgadf + d.xnode,
            xnode: d.xnode,
            xinc: d.xinc,
        };

        let mut state = osculate(&self.periodic, &secular);
        state.inclination = d.xinc;
        state.raan = d.xnode;
        state
    }
}
