//! Lunar-solar and geopotential resonance perturbations for deep-space
//! orbits.

use super::consts::{
    C1L, C1SS, G22, G32, G44, G52, G54, PI, Q22, Q31, Q33, ROOT22, ROOT32, ROOT44, ROOT52,
    ROOT54, THDT, TWOPI, ZCOSGS, ZCOSIS, ZEL, ZES, ZNL, ZNS, ZSINGS, ZSINIS,
};
use super::ephemeris::SelectedElements;
use super::math::{ac_tan, fmod2p};
use super::time::theta_g;

const FASX2: f64 = 0.13130908;
const FASX4: f64 = 2.8843198;
const FASX6: f64 = 0.37448087;

/// Integrator step, minutes.
const STEPP: f64 = 720.0;
const STEPN: f64 = -720.0;
const STEP2: f64 = 259200.0;

/// Below this inclination the node term of the lunar-solar secular rates
/// is dropped.
const SMALL_INCLINATION: f64 = 5.2359877E-2;

/// Below this inclination periodics use the Lyddane modification.
const LYDDANE_INCLINATION: f64 = 0.2;

/// Lunar-solar periodics are recomputed after this many minutes.
const PERIODIC_REFRESH: f64 = 30.0;

/// Epoch quantities SDP4 hands to the deep-space initialization.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeepEpoch {
    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub eosq: f64,
    pub betao: f64,
    pub betao2: f64,
    pub sing: f64,
    pub cosg: f64,
    pub xnodp: f64,
    pub aodp: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
}

/// Working elements passed through the secular and periodic updates.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DeepArgs {
    pub t: f64,
    pub xll: f64,
    pub omgadf: f64,
    pub xnode: f64,
    pub em: f64,
    pub xinc: f64,
    pub xn: f64,
}

/// Coefficients of the long-period terms of one perturbing body.
#[derive(Debug, Clone, Copy, Default)]
struct BodyTerms {
    e2: f64,
    e3: f64,
    i2: f64,
    i3: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    gh2: f64,
    gh3: f64,
    gh4: f64,
    h2: f64,
    h3: f64,
}

/// Secular rates contributed by one perturbing body.
#[derive(Debug, Clone, Copy, Default)]
struct BodyRates {
    se: f64,
    si: f64,
    sl: f64,
    sgh: f64,
    sh: f64,
}

/// Orientation of a perturbing body's orbit.
struct BodyGeometry {
    zcosg: f64,
    zsing: f64,
    zcosi: f64,
    zsini: f64,
    zcosh: f64,
    zsinh: f64,
    cc: f64,
    zn: f64,
    ze: f64,
}

#[derive(Debug, Clone, Copy)]
enum ResonanceKind {
    /// One revolution per sidereal day
    Synchronous { del1: f64, del2: f64, del3: f64 },
    /// Twelve hour, eccentric
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Resonance {
    kind: ResonanceKind,
    xlamo: f64,
    xfact: f64,
}

/// State of the numerical integration of the resonance terms.
///
/// The integration proceeds in 720 minute steps from the last reached time,
/// so the result for a given `t` depends on the previous request. It
/// restarts at epoch whenever `t` changes sign relative to the stored time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonanceIntegrator {
    pub atime: f64,
    pub xli: f64,
    pub xni: f64,
}

/// Derivatives at the current integrator state.
struct Rates {
    xldot: f64,
    xndot: f64,
    xnddt: f64,
}

/// Cached lunar-solar periodics.
#[derive(Debug, Clone, Copy)]
struct PeriodicCache {
    savtsn: f64,
    sghs: f64,
    shs: f64,
    sghl: f64,
    sh1: f64,
    pe: f64,
    pinc: f64,
    pl: f64,
}

impl Default for PeriodicCache {
    fn default() -> Self {
        PeriodicCache {
            savtsn: 1E20,
            sghs: 0.0,
            shs: 0.0,
            sghl: 0.0,
            sh1: 0.0,
            pe: 0.0,
            pinc: 0.0,
            pl: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeepSpace {
    thgr: f64,
    xnq: f64,
    xqncl: f64,
    omegaq: f64,
    omgdot: f64,
    cosio: f64,
    sinio: f64,
    zmol: f64,
    zmos: f64,
    sse: f64,
    ssi: f64,
    ssl: f64,
    ssg: f64,
    ssh: f64,
    solar: BodyTerms,
    lunar: BodyTerms,
    resonance: Option<Resonance>,
    integrator: ResonanceIntegrator,
    cache: PeriodicCache,
}

impl DeepSpace {
    pub(crate) fn new(el: &SelectedElements, ep: &DeepEpoch) -> Self {
        let (thgr, ds50) = theta_g(el.epoch);
        let eq = el.eo;
        let xnq = ep.xnodp;
        let aqnv = 1.0 / ep.aodp;
        let xqncl = el.xincl;
        let xmao = el.xmo;
        let xpidot = ep.omgdot + ep.xnodot;
        let (sinq, cosq) = el.xnodeo.sin_cos();

        // Lunar orbit at epoch, days since 1900 Jan 0.5
        let day = ds50 + 18261.5;
        let xnodce = 4.5236020 - 9.2422029E-4 * day;
        let (stem, ctem) = xnodce.sin_cos();
        let zcosil = 0.91375164 - 0.03568096 * ctem;
        let zsinil = (1.0 - zcosil * zcosil).sqrt();
        let zsinhl = 0.089683511 * stem / zsinil;
        let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
        let c = 4.7199672 + 0.22997150 * day;
        let gam = 5.8351514 + 0.0019443680 * day;
        let zmol = fmod2p(c - gam);
        let zx = 0.39785416 * stem / zsinil;
        let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
        let zx = gam + ac_tan(zx, zy) - xnodce;
        let zmos = fmod2p(6.2565837 + 0.017201977 * day);

        let xnoi = 1.0 / xnq;
        let sun = BodyGeometry {
            zcosg: ZCOSGS,
            zsing: ZSINGS,
            zcosi: ZCOSIS,
            zsini: ZSINIS,
            zcosh: cosq,
            zsinh: sinq,
            cc: C1SS,
            zn: ZNS,
            ze: ZES,
        };
        let moon = BodyGeometry {
            zcosg: zx.cos(),
            zsing: zx.sin(),
            zcosi: zcosil,
            zsini: zsinil,
            zcosh: zcoshl * cosq + zsinhl * sinq,
            zsinh: sinq * zcoshl - cosq * zsinhl,
            cc: C1L,
            zn: ZNL,
            ze: ZEL,
        };

        let (solar_rates, solar) = body_terms(&sun, ep, eq, xnoi, xqncl);
        let (lunar_rates, lunar) = body_terms(&moon, ep, eq, xnoi, xqncl);

        let ssh_solar = solar_rates.sh / ep.sinio;
        let sse = solar_rates.se + lunar_rates.se;
        let ssi = solar_rates.si + lunar_rates.si;
        let ssl = solar_rates.sl + lunar_rates.sl;
        let ssg = solar_rates.sgh - ep.cosio * ssh_solar + lunar_rates.sgh
            - ep.cosio / ep.sinio * lunar_rates.sh;
        let ssh = ssh_solar + lunar_rates.sh / ep.sinio;

        let mut deep = DeepSpace {
            thgr,
            xnq,
            xqncl,
            omegaq: el.omegao,
            omgdot: ep.omgdot,
            cosio: ep.cosio,
            sinio: ep.sinio,
            zmol,
            zmos,
            sse,
            ssi,
            ssl,
            ssg,
            ssh,
            solar,
            lunar,
            resonance: None,
            integrator: ResonanceIntegrator {
                atime: 0.0,
                xli: 0.0,
                xni: xnq,
            },
            cache: PeriodicCache::default(),
        };

        let synchronous_band = xnq < 0.0052359877 && xnq > 0.0034906585;
        let resonance = if synchronous_band {
            Some(deep.synchronous(el, ep, aqnv, xmao, xpidot))
        } else if xnq < 0.00826 || xnq > 0.00924 || eq < 0.5 {
            None
        } else {
            Some(deep.half_day(el, ep, eq, aqnv, xmao))
        };

        if let Some(res) = resonance {
            deep.integrator = ResonanceIntegrator {
                atime: 0.0,
                xli: res.xlamo,
                xni: xnq,
            };
            log::trace!(
                "Deep space resonance {} for xnq={}",
                match res.kind {
                    ResonanceKind::Synchronous { .. } => "synchronous",
                    ResonanceKind::HalfDay { .. } => "12h",
                },
                xnq
            );
        }
        deep.resonance = resonance;
        deep
    }

    fn synchronous(
        &self,
        el: &SelectedElements,
        ep: &DeepEpoch,
        aqnv: f64,
        xmao: f64,
        xpidot: f64,
    ) -> Resonance {
        let g200 = 1.0 + ep.eosq * (-2.5 + 0.8125 * ep.eosq);
        let g310 = 1.0 + 2.0 * ep.eosq;
        let g300 = 1.0 + ep.eosq * (-6.0 + 6.60937 * ep.eosq);
        let f220 = 0.75 * (1.0 + ep.cosio) * (1.0 + ep.cosio);
        let f311 = 0.9375 * ep.sinio * ep.sinio * (1.0 + 3.0 * ep.cosio) - 0.75 * (1.0 + ep.cosio);
        let f330 = 1.0 + ep.cosio;
        let f330 = 1.875 * f330 * f330 * f330;
        let del1 = 3.0 * self.xnq * self.xnq * aqnv * aqnv;
        let del2 = 2.0 * del1 * f220 * g200 * Q22;
        let del3 = 3.0 * del1 * f330 * g300 * Q33 * aqnv;
        let del1 = del1 * f311 * g310 * Q31 * aqnv;

        let xlamo = xmao + el.xnodeo + el.omegao - self.thgr;
        let bfact = ep.xmdot + xpidot - THDT + self.ssl + self.ssg + self.ssh;

        Resonance {
            kind: ResonanceKind::Synchronous { del1, del2, del3 },
            xlamo,
            xfact: bfact - self.xnq,
        }
    }

    fn half_day(
        &self,
        el: &SelectedElements,
        ep: &DeepEpoch,
        eq: f64,
        aqnv: f64,
        xmao: f64,
    ) -> Resonance {
        let eosq = ep.eosq;
        let eoc = eq * eosq;
        let g201 = -0.306 - (eq - 0.64) * 0.440;
        let (g211, g310, g322, g410, g422, g520);
        if eq <= 0.65 {
            g211 = 3.616 - 13.247 * eq + 16.290 * eosq;
            g310 = -19.302 + 117.390 * eq - 228.419 * eosq + 156.591 * eoc;
            g322 = -18.9068 + 109.7927 * eq - 214.6334 * eosq + 146.5816 * eoc;
            g410 = -41.122 + 242.694 * eq - 471.094 * eosq + 313.953 * eoc;
            g422 = -146.407 + 841.880 * eq - 1629.014 * eosq + 1083.435 * eoc;
            g520 = -532.114 + 3017.977 * eq - 5740.0 * eosq + 3708.276 * eoc;
        } else {
            g211 = -72.099 + 331.819 * eq - 508.738 * eosq + 266.724 * eoc;
            g310 = -346.844 + 1582.851 * eq - 2415.925 * eosq + 1246.113 * eoc;
            g322 = -342.585 + 1554.908 * eq - 2366.899 * eosq + 1215.972 * eoc;
            g410 = -1052.797 + 4758.686 * eq - 7193.992 * eosq + 3651.957 * eoc;
            g422 = -3581.69 + 16178.11 * eq - 24462.77 * eosq + 12422.52 * eoc;
            g520 = if eq <= 0.715 {
                1464.74 - 4664.75 * eq + 3763.64 * eosq
            } else {
                -5149.66 + 29936.92 * eq - 54087.36 * eosq + 31324.56 * eoc
            };
        }

        let (g533, g521, g532) = if eq < 0.7 {
            (
                -919.2277 + 4988.61 * eq - 9064.77 * eosq + 5542.21 * eoc,
                -822.71072 + 4568.6173 * eq - 8491.4146 * eosq + 5337.524 * eoc,
                -853.666 + 4690.25 * eq - 8624.77 * eosq + 5341.4 * eoc,
            )
        } else {
            (
                -37995.78 + 161616.52 * eq - 229838.2 * eosq + 109377.94 * eoc,
                -51752.104 + 218913.95 * eq - 309468.16 * eosq + 146349.42 * eoc,
                -40023.88 + 170470.89 * eq - 242699.48 * eosq + 115605.82 * eoc,
            )
        };

        let (sinio, cosio, theta2) = (ep.sinio, ep.cosio, ep.theta2);
        let sini2 = sinio * sinio;
        let f220 = 0.75 * (1.0 + 2.0 * cosio + theta2);
        let f221 = 1.5 * sini2;
        let f321 = 1.875 * sinio * (1.0 - 2.0 * cosio - 3.0 * theta2);
        let f322 = -1.875 * sinio * (1.0 + 2.0 * cosio - 3.0 * theta2);
        let f441 = 35.0 * sini2 * f220;
        let f442 = 39.3750 * sini2 * sini2;
        let f522 = 9.84375
            * sinio
            * (sini2 * (1.0 - 2.0 * cosio - 5.0 * theta2)
                + 0.33333333 * (-2.0 + 4.0 * cosio + 6.0 * theta2));
        let f523 = sinio
            * (4.92187512 * sini2 * (-2.0 - 4.0 * cosio + 10.0 * theta2)
                + 6.56250012 * (1.0 + 2.0 * cosio - 3.0 * theta2));
        let f542 = 29.53125
            * sinio
            * (2.0 - 8.0 * cosio + theta2 * (-12.0 + 8.0 * cosio + 10.0 * theta2));
        let f543 = 29.53125
            * sinio
            * (-2.0 - 8.0 * cosio + theta2 * (12.0 + 8.0 * cosio - 10.0 * theta2));

        let xno2 = self.xnq * self.xnq;
        let ainv2 = aqnv * aqnv;
        let mut temp1 = 3.0 * xno2 * ainv2;
        let temp = temp1 * ROOT22;
        let d2201 = temp * f220 * g201;
        let d2211 = temp * f221 * g211;
        temp1 *= aqnv;
        let temp = temp1 * ROOT32;
        let d3210 = temp * f321 * g310;
        let d3222 = temp * f322 * g322;
        temp1 *= aqnv;
        let temp = 2.0 * temp1 * ROOT44;
        let d4410 = temp * f441 * g410;
        let d4422 = temp * f442 * g422;
        temp1 *= aqnv;
        let temp = temp1 * ROOT52;
        let d5220 = temp * f522 * g520;
        let d5232 = temp * f523 * g532;
        let temp = 2.0 * temp1 * ROOT54;
        let d5421 = temp * f542 * g521;
        let d5433 = temp * f543 * g533;

        let xlamo = xmao + el.xnodeo + el.xnodeo - self.thgr - self.thgr;
        let bfact = ep.xmdot + ep.xnodot + ep.xnodot - THDT - THDT + self.ssl + self.ssh + self.ssh;

        Resonance {
            kind: ResonanceKind::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            },
            xlamo,
            xfact: bfact - self.xnq,
        }
    }

    pub fn is_resonant(&self) -> bool {
        self.resonance.is_some()
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(
            self.resonance,
            Some(Resonance {
                kind: ResonanceKind::Synchronous { .. },
                ..
            })
        )
    }

    pub fn integrator(&self) -> &ResonanceIntegrator {
        &self.integrator
    }

    /// Lunar-solar secular rates and, for resonant orbits, the integrated
    /// mean motion and mean longitude.
    pub(crate) fn secular(&mut self, el: &SelectedElements, d: &mut DeepArgs) {
        d.xll += self.ssl * d.t;
        d.omgadf += self.ssg * d.t;
        d.xnode += self.ssh * d.t;
        d.em = el.eo + self.sse * d.t;
        d.xinc = el.xincl + self.ssi * d.t;
        if d.xinc < 0.0 {
            d.xinc = -d.xinc;
            d.xnode += PI;
            d.omgadf -= PI;
        }

        let Some(res) = self.resonance else {
            return;
        };

        let (integrator, ft, rates) =
            self.integrator
                .advance(&res, self.xnq, self.omegaq, self.omgdot, d.t);
        self.integrator = integrator;
        let ResonanceIntegrator { xli, xni, .. } = integrator;

        d.xn = xni + rates.xndot * ft + rates.xnddt * ft * ft * 0.5;
        let xl = xli + rates.xldot * ft + rates.xndot * ft * ft * 0.5;
        let temp = -d.xnode + self.thgr + d.t * THDT;
        d.xll = match res.kind {
            ResonanceKind::Synchronous { .. } => xl - d.omgadf + temp,
            ResonanceKind::HalfDay { .. } => xl + temp + temp,
        };
    }

    /// Lunar-solar periodics.
    pub(crate) fn periodics(&mut self, d: &mut DeepArgs) {
        let (sinis, cosis) = d.xinc.sin_cos();

        if (self.cache.savtsn - d.t).abs() >= PERIODIC_REFRESH {
            self.cache = self.periodic_terms(d.t);
        }
        let c = &self.cache;

        let mut pgh = c.sghs + c.sghl;
        let mut ph = c.shs + c.sh1;
        d.xinc += c.pinc;
        d.em += c.pe;

        if self.xqncl >= LYDDANE_INCLINATION {
            ph /= self.sinio;
            pgh -= self.cosio * ph;
            d.omgadf += pgh;
            d.xnode += ph;
            d.xll += c.pl;
            return;
        }

        // Lyddane modification
        let (sinok, cosok) = d.xnode.sin_cos();
        let mut alfdp = sinis * sinok;
        let mut betdp = sinis * cosok;
        let dalf = ph * cosok + c.pinc * cosis * sinok;
        let dbet = -ph * sinok + c.pinc * cosis * cosok;
        alfdp += dalf;
        betdp += dbet;
        d.xnode = fmod2p(d.xnode);
        let mut xls = d.xll + d.omgadf + cosis * d.xnode;
        let dls = c.pl + pgh - c.pinc * d.xnode * sinis;
        xls += dls;
        let xnoh = d.xnode;
        d.xnode = ac_tan(alfdp, betdp);

        // Keep the node continuous across the 0/2π wrap.
        if (xnoh - d.xnode).abs() > PI {
            if d.xnode < xnoh {
                d.xnode += TWOPI;
            } else {
                d.xnode -= TWOPI;
            }
        }

        d.xll += c.pl;
        d.omgadf = xls - d.xll - d.xinc.cos() * d.xnode;
    }

    fn periodic_terms(&self, t: f64) -> PeriodicCache {
        let (f2, f3, sinzf) = phase_factors(self.zmos + ZNS * t, ZES);
        let s = &self.solar;
        let ses = s.e2 * f2 + s.e3 * f3;
        let sis = s.i2 * f2 + s.i3 * f3;
        let sls = s.l2 * f2 + s.l3 * f3 + s.l4 * sinzf;
        let sghs = s.gh2 * f2 + s.gh3 * f3 + s.gh4 * sinzf;
        let shs = s.h2 * f2 + s.h3 * f3;

        let (f2, f3, sinzf) = phase_factors(self.zmol + ZNL * t, ZEL);
        let l = &self.lunar;
        let sel = l.e2 * f2 + l.e3 * f3;
        let sil = l.i2 * f2 + l.i3 * f3;
        let sll = l.l2 * f2 + l.l3 * f3 + l.l4 * sinzf;
        let sghl = l.gh2 * f2 + l.gh3 * f3 + l.gh4 * sinzf;
        let sh1 = l.h2 * f2 + l.h3 * f3;

        PeriodicCache {
            savtsn: t,
            sghs,
            shs,
            sghl,
            sh1,
            pe: ses + sel,
            pinc: sis + sil,
            pl: sls + sll,
        }
    }
}

impl ResonanceIntegrator {
    /// Steps the integrator towards `t`. Returns the reached state, the
    /// remaining partial step and the derivatives at the reached state.
    fn advance(
        mut self,
        res: &Resonance,
        xnq: f64,
        omegaq: f64,
        omgdot: f64,
        t: f64,
    ) -> (Self, f64, Rates) {
        let mut delt = 0.0;
        let mut ft = 0.0;

        loop {
            let restart_at_epoch = self.atime == 0.0
                || (t >= 0.0 && self.atime < 0.0)
                || (t < 0.0 && self.atime >= 0.0);
            if restart_at_epoch {
                delt = if t >= 0.0 { STEPP } else { STEPN };
                self.atime = 0.0;
                self.xni = xnq;
                self.xli = res.xlamo;
            } else if t.abs() >= self.atime.abs() {
                delt = if t > 0.0 { STEPP } else { STEPN };
            }

            let (stepping, stepped_back, rates) = loop {
                let mut stepping = (t - self.atime).abs() >= STEPP;
                if !stepping {
                    ft = t - self.atime;
                }

                // Past the requested time: take one step back towards epoch.
                let stepped_back = t.abs() < self.atime.abs();
                if stepped_back {
                    delt = if t >= 0.0 { STEPN } else { STEPP };
                    stepping = true;
                }

                let rates = self.rates(res, omegaq, omgdot);
                if stepping {
                    self.xli += rates.xldot * delt + rates.xndot * STEP2;
                    self.xni += rates.xndot * delt + rates.xnddt * STEP2;
                    self.atime += delt;
                }

                if !stepping || stepped_back {
                    break (stepping, stepped_back, rates);
                }
            };

            if !(stepping && stepped_back) {
                return (self, ft, rates);
            }
        }
    }

    fn rates(&self, res: &Resonance, omegaq: f64, omgdot: f64) -> Rates {
        let xli = self.xli;
        let (xndot, xnddt) = match res.kind {
            ResonanceKind::Synchronous { del1, del2, del3 } => (
                del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin(),
                del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos(),
            ),
            ResonanceKind::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            } => {
                let xomi = omegaq + omgdot * self.atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                (
                    d2201 * (x2omi + xli - G22).sin()
                        + d2211 * (xli - G22).sin()
                        + d3210 * (xomi + xli - G32).sin()
                        + d3222 * (-xomi + xli - G32).sin()
                        + d4410 * (x2omi + x2li - G44).sin()
                        + d4422 * (x2li - G44).sin()
                        + d5220 * (xomi + xli - G52).sin()
                        + d5232 * (-xomi + xli - G52).sin()
                        + d5421 * (xomi + x2li - G54).sin()
                        + d5433 * (-xomi + x2li - G54).sin(),
                    d2201 * (x2omi + xli - G22).cos()
                        + d2211 * (xli - G22).cos()
                        + d3210 * (xomi + xli - G32).cos()
                        + d3222 * (-xomi + xli - G32).cos()
                        + d5220 * (xomi + xli - G52).cos()
                        + d5232 * (-xomi + xli - G52).cos()
                        + 2.0
                            * (d4410 * (x2omi + x2li - G44).cos()
                                + d4422 * (x2li - G44).cos()
                                + d5421 * (xomi + x2li - G54).cos()
                                + d5433 * (-xomi + x2li - G54).cos()),
                )
            }
        };

        let xldot = self.xni + res.xfact;
        Rates {
            xldot,
            xndot,
            xnddt: xnddt * xldot,
        }
    }
}

/// `f2`, `f3` and `sin(zf)` for a body at mean anomaly `zm`.
fn phase_factors(zm: f64, ze: f64) -> (f64, f64, f64) {
    let zf = zm + 2.0 * ze * zm.sin();
    let sinzf = zf.sin();
    (0.5 * sinzf * sinzf - 0.25, -0.5 * sinzf * zf.cos(), sinzf)
}

/// Secular rates and periodic coefficients of one perturbing body.
fn body_terms(
    g: &BodyGeometry,
    ep: &DeepEpoch,
    eq: f64,
    xnoi: f64,
    xqncl: f64,
) -> (BodyRates, BodyTerms) {
    let eosq = ep.eosq;
    let a1 = g.zcosg * g.zcosh + g.zsing * g.zcosi * g.zsinh;
    let a3 = -g.zsing * g.zcosh + g.zcosg * g.zcosi * g.zsinh;
    let a7 = -g.zcosg * g.zsinh + g.zsing * g.zcosi * g.zcosh;
    let a8 = g.zsing * g.zsini;
    let a9 = g.zsing * g.zsinh + g.zcosg * g.zcosi * g.zcosh;
    let a10 = g.zcosg * g.zsini;
    let a2 = ep.cosio * a7 + ep.sinio * a8;
    let a4 = ep.cosio * a9 + ep.sinio * a10;
    let a5 = -ep.sinio * a7 + ep.cosio * a8;
    let a6 = -ep.sinio * a9 + ep.cosio * a10;
    let x1 = a1 * ep.cosg + a2 * ep.sing;
    let x2 = a3 * ep.cosg + a4 * ep.sing;
    let x3 = -a1 * ep.sing + a2 * ep.cosg;
    let x4 = -a3 * ep.sing + a4 * ep.cosg;
    let x5 = a5 * ep.sing;
    let x6 = a6 * ep.sing;
    let x7 = a5 * ep.cosg;
    let x8 = a6 * ep.cosg;
    let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
    let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
    let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
    let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * eosq;
    let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * eosq;
    let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * eosq;
    let z11 = -6.0 * a1 * a5 + eosq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
    let z12 = -6.0 * (a1 * a6 + a3 * a5)
        + eosq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
    let z13 = -6.0 * a3 * a6 + eosq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
    let z21 = 6.0 * a2 * a5 + eosq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
    let z22 = 6.0 * (a4 * a5 + a2 * a6)
        + eosq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
    let z23 = 6.0 * a4 * a6 + eosq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
    let z1 = z1 + z1 + ep.betao2 * z31;
    let z2 = z2 + z2 + ep.betao2 * z32;
    let z3 = z3 + z3 + ep.betao2 * z33;
    let s3 = g.cc * xnoi;
    let s2 = -0.5 * s3 / ep.betao;
    let s4 = s3 * ep.betao;
    let s1 = -15.0 * eq * s4;
    let s5 = x1 * x3 + x2 * x4;
    let s6 = x2 * x3 + x1 * x4;
    let s7 = x2 * x4 - x1 * x3;

    let mut sh = -g.zn * s2 * (z21 + z23);
    if xqncl < SMALL_INCLINATION {
        sh = 0.0;
    }
    let rates = BodyRates {
        se: s1 * g.zn * s5,
        si: s2 * g.zn * (z11 + z13),
        sl: -g.zn * s3 * (z1 + z3 - 14.0 - 6.0 * eosq),
        sgh: s4 * g.zn * (z31 + z33 - 6.0),
        sh,
    };

    let terms = BodyTerms {
        e2: 2.0 * s1 * s6,
        e3: 2.0 * s1 * s7,
        i2: 2.0 * s2 * z12,
        i3: 2.0 * s2 * (z13 - z11),
        l2: -2.0 * s3 * z2,
        l3: -2.0 * s3 * (z3 - z1),
        l4: -2.0 * s3 * (-21.0 - 9.0 * eosq) * g.ze,
        gh2: 2.0 * s4 * z32,
        gh3: 2.0 * s4 * (z33 - z31),
        gh4: -18.0 * s4 * g.ze,
        h2: -2.0 * s2 * z22,
        h3: -2.0 * s2 * (z23 - z21),
    };

    (rates, terms)
}
