use super::consts::{AE, CK2, CK4, QOMS2T, S, TOTHRD, XJ3, XKE, XKMPER};
use super::ephemeris::SelectedElements;
use super::kepler::{osculate, OrbitState, PeriodicCoefficients, SecularElements};

/// Quantities SGP4 derives once from the element set.
#[derive(Debug, Clone)]
pub struct Sgp4 {
    periodic: PeriodicCoefficients,
    aodp: f64,
    xnodp: f64,
    eta: f64,
    c1: f64,
    c4: f64,
    c5: f64,
    xmdot: f64,
    omgdot: f64,
    xnodot: f64,
    omgcof: f64,
    xmcof: f64,
    xnodcf: f64,
    t2cof: f64,
    delmo: f64,
    sinmo: f64,
    /// Perigee below 220 km: drop the higher-order drag terms.
    simple: bool,
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
}

/// Adjusted drag parameters for perigee heights below 156 km.
pub(crate) fn drag_parameters(aodp: f64, eo: f64) -> (f64, f64) {
    let mut s4 = S;
    let mut qoms24 = QOMS2T;
    let perige = (aodp * (1.0 - eo) - AE) * XKMPER;
    if perige < 156.0 {
        s4 = if perige <= 98.0 { 20.0 } else { perige - 78.0 };
        qoms24 = ((120.0 - s4) * AE / XKMPER).powi(4);
        s4 = s4 / XKMPER + AE;
    }
    (s4, qoms24)
}

/// Recovers the original mean motion and semimajor axis from the element set.
pub(crate) fn recover_mean_motion(xno: f64, eo: f64, x3thm1: f64) -> (f64, f64) {
    let a1 = (XKE / xno).powf(TOTHRD);
    let betao2 = 1.0 - eo * eo;
    let betao = betao2.sqrt();
    let del1 = 1.5 * CK2 * x3thm1 / (a1 * a1 * betao * betao2);
    let ao = a1 * (1.0 - del1 * (0.5 * TOTHRD + del1 * (1.0 + 134.0 / 81.0 * del1)));
    let delo = 1.5 * CK2 * x3thm1 / (ao * ao * betao * betao2);
    (xno / (1.0 + delo), ao / (1.0 - delo))
}

impl Sgp4 {
    pub fn new(el: &SelectedElements) -> Self {
        let cosio = el.xincl.cos();
        let theta2 = cosio * cosio;
        let x3thm1 = 3.0 * theta2 - 1.0;
        let eosq = el.eo * el.eo;
        let betao2 = 1.0 - eosq;
        let betao = betao2.sqrt();
        let (xnodp, aodp) = recover_mean_motion(el.xno, el.eo, x3thm1);

        let simple = aodp * (1.0 - el.eo) / AE < 220.0 / XKMPER + AE;
        let (s4, qoms24) = drag_parameters(aodp, el.eo);

        let pinvsq = 1.0 / (aodp * aodp * betao2 * betao2);
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
        let c1 = c2 * el.bstar;
        let sinio = el.xincl.sin();
        let a3ovk2 = -XJ3 / CK2 * AE.powi(3);
        let c3 = coef * tsi * a3ovk2 * xnodp * AE * sinio / el.eo;
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
        let c5 = 2.0 * coef1 * aodp * betao2 * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);
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

        let mut model = Sgp4 {
            periodic: PeriodicCoefficients {
                cosio,
                sinio,
                x3thm1,
                x1mth2,
                x7thm1: 7.0 * theta2 - 1.0,
                xlcof: 0.125 * a3ovk2 * sinio * (3.0 + 5.0 * cosio) / (1.0 + cosio),
                aycof: 0.25 * a3ovk2 * sinio,
            },
            aodp,
            xnodp,
            eta,
            c1,
            c4,
            c5,
            xmdot,
            omgdot,
            xnodot,
            omgcof: el.bstar * c3 * el.omegao.cos(),
            xmcof: -TOTHRD * coef * el.bstar * AE / eeta,
            xnodcf: 3.5 * betao2 * xhdot1 * c1,
            t2cof: 1.5 * c1,
            delmo: (1.0 + eta * el.xmo.cos()).powi(3),
            sinmo: el.xmo.sin(),
            simple,
            d2: 0.0,
            d3: 0.0,
            d4: 0.0,
            t3cof: 0.0,
            t4cof: 0.0,
            t5cof: 0.0,
        };

        if !simple {
            let c1sq = c1 * c1;
            let d2 = 4.0 * aodp * tsi * c1sq;
            let temp = d2 * tsi * c1 / 3.0;
            let d3 = (17.0 * aodp + s4) * temp;
            let d4 = 0.5 * temp * aodp * tsi * (221.0 * aodp + 31.0 * s4) * c1;
            model.d2 = d2;
            model.d3 = d3;
            model.d4 = d4;
            model.t3cof = d2 + 2.0 * c1sq;
            model.t4cof = 0.25 * (3.0 * d3 + c1 * (12.0 * d2 + 10.0 * c1sq));
            model.t5cof =
                0.2 * (3.0 * d4 + 12.0 * c1 * d3 + 6.0 * d2 * d2 + 15.0 * c1sq * (2.0 * d2 + c1sq));
        }

        model
    }

    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// State at `tsince` minutes from epoch.
    pub fn propagate(&self, el: &SelectedElements, tsince: f64) -> OrbitState {
        // Secular gravity and atmospheric drag
        let xmdf = el.xmo + self.xmdot * tsince;
        let omgadf = el.omegao + self.omgdot * tsince;
        let xnoddf = el.xnodeo + self.xnodot * tsince;
        let mut omega = omgadf;
        let mut xmp = xmdf;
        let tsq = tsince * tsince;
        let xnode = xnoddf + self.xnodcf * tsq;
        let mut tempa = 1.0 - self.c1 * tsince;
        let mut tempe = el.bstar * self.c4 * tsince;
        let mut templ = self.t2cof * tsq;

        if !self.simple {
            let delomg = self.omgcof * tsince;
            let delm = self.xmcof * ((1.0 + self.eta * xmdf.cos()).powi(3) - self.delmo);
            let temp = delomg + delm;
            xmp = xmdf + temp;
            omega = omgadf - temp;
            let tcube = tsq * tsince;
            let tfour = tsince * tcube;
            tempa = tempa - self.d2 * tsq - self.d3 * tcube - self.d4 * tfour;
            tempe += el.bstar * self.c5 * (xmp.sin() - self.sinmo);
            templ += self.t3cof * tcube + tfour * (self.t4cof + tsince * self.t5cof);
        }

        let secular = SecularElements {
            a: self.aodp * tempa * tempa,
            e: el.eo - tempe,
            omega,
            omgadf,
            xl: xmp + omega + xnode + self.xnodp * templ,
            xnode,
            xinc: el.xincl,
        };

        osculate(&self.periodic, &secular)
    }
}
