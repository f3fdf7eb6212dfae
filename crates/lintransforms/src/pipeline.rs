use std::{collections::HashMap, time::Instant};

use ndarray::{Array2, ArrayD};

use crate::{
    error::{SolverError, TransformError},
    solvers::Solver,
    transforms::Transformation,
};

/// Outcome of a single solver in [`Pipeline::solve`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The fitted matrix.
    Solution(Array2<f64>),
    /// The message of the linear algebra error raised by the solver.
    Failed(String),
}

impl SolveOutcome {
    /// The fitted matrix, if the solver succeeded.
    pub fn solution(&self) -> Option<&Array2<f64>> {
        match self {
            SolveOutcome::Solution(solution) => Some(solution),
            SolveOutcome::Failed(_) => None,
        }
    }

    /// The error message, if the solver failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            SolveOutcome::Solution(_) => None,
            SolveOutcome::Failed(message) => Some(message.as_str()),
        }
    }
}

/// An ordered chain of transformations together with a set of solvers.
///
/// A pipeline is itself a [`Transformation`], so pipelines can be nested.
///
/// # Example
///
/// ```
/// use lintransforms::{Dilation, Exact, LeastSquares, Pipeline, Transformation, Translation};
/// use ndarray::array;
///
/// let pipeline = Pipeline::new()
///     .with_transformation(Dilation::new(2.0))
///     .with_transformation(Translation::new(array![1.0, 1.0]))
///     .with_solver(Exact)
///     .with_solver(LeastSquares);
///
/// assert_eq!(pipeline.name(), "Dilation(factor=2.0) -> Translation(offset=[1.0, 1.0])");
///
/// let out = pipeline.apply(&array![[1.0, 2.0]].into_dyn())?;
/// assert_eq!(out, array![[3.0, 5.0]].into_dyn());
///
/// let singular = array![[1.0, 1.0], [1.0, 1.0]];
/// let results = pipeline.solve(&singular, &array![[1.0], [2.0]])?;
/// assert!(results["Exact Solver"].error().is_some());
/// assert!(results["Least Squares"].solution().is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct Pipeline {
    transformations: Vec<Box<dyn Transformation>>,
    solvers: Vec<Box<dyn Solver>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from its stages.
    pub fn from_parts(
        transformations: Vec<Box<dyn Transformation>>,
        solvers: Vec<Box<dyn Solver>>,
    ) -> Self {
        Self {
            transformations,
            solvers,
        }
    }

    /// Append a transformation.
    pub fn with_transformation(mut self, transformation: impl Transformation + 'static) -> Self {
        self.transformations.push(Box::new(transformation));
        self
    }

    /// Append a solver.
    pub fn with_solver(mut self, solver: impl Solver + 'static) -> Self {
        self.solvers.push(Box::new(solver));
        self
    }

    /// The transformations, in application order.
    pub fn transformations(&self) -> &[Box<dyn Transformation>] {
        &self.transformations
    }

    /// The solvers.
    pub fn solvers(&self) -> &[Box<dyn Solver>] {
        &self.solvers
    }

    /// Apply every transformation in order. The first failure aborts the chain.
    pub fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        let mut out = x.clone();
        for transformation in &self.transformations {
            out = transformation.apply(&out)?;
        }
        Ok(out)
    }

    /// Run every solver on the same data.
    ///
    /// Results are keyed by solver name; a later solver with the same name
    /// replaces the earlier entry. Linear algebra errors are recorded as
    /// [`SolveOutcome::Failed`]; any other error aborts the whole call.
    pub fn solve(
        &self,
        x: &Array2<f64>,
        y: &Array2<f64>,
    ) -> Result<HashMap<String, SolveOutcome>, SolverError> {
        let mut results = HashMap::with_capacity(self.solvers.len());

        for solver in &self.solvers {
            let name = solver.name();
            let start = Instant::now();

            let outcome = match solver.solve(x, y) {
                Ok(solution) => SolveOutcome::Solution(solution),
                Err(SolverError::Linalg(e)) => {
                    log::debug!("{name} failed: {e}");
                    SolveOutcome::Failed(e.to_string())
                }
                Err(e) => return Err(e),
            };
            log::debug!("{name} took {:?}", start.elapsed());

            results.insert(name, outcome);
        }

        Ok(results)
    }
}

impl Transformation for Pipeline {
    fn name(&self) -> String {
        self.transformations
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn apply(&self, x: &ArrayD<f64>) -> Result<ArrayD<f64>, TransformError> {
        Pipeline::apply(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        solvers::{Exact, LeastSquares, PseudoInverse},
        transforms::{Dilation, Identity, Reflection, Translation},
    };
    use ndarray::array;

    struct Constant(&'static str, f64);

    impl Solver for Constant {
        fn name(&self) -> String {
            self.0.to_string()
        }

        fn solve(&self, _x: &Array2<f64>, _y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
            Ok(array![[self.1]])
        }
    }

    struct Misconfigured;

    impl Solver for Misconfigured {
        fn name(&self) -> String {
            "Misconfigured".to_string()
        }

        fn solve(&self, _x: &Array2<f64>, _y: &Array2<f64>) -> Result<Array2<f64>, SolverError> {
            Err(SolverError::InvalidConfig("always".to_string()))
        }
    }

    #[test]
    fn test_empty_pipeline_is_identity() -> Result<(), TransformError> {
        let x = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.apply(&x)?, x);
        assert_eq!(Transformation::name(&pipeline), "");
        Ok(())
    }

    #[test]
    fn test_apply_aborts_on_first_failure() {
        let pipeline = Pipeline::new()
            .with_transformation(Dilation::new(2.0))
            .with_transformation(Reflection::new(5))
            .with_transformation(Identity);
        let x = array![1.0, 2.0].into_dyn();
        assert!(matches!(
            pipeline.apply(&x),
            Err(TransformError::InvalidAxis { axis: 5, ndim: 1 })
        ));
    }

    #[test]
    fn test_nested_pipeline_name() {
        let inner = Pipeline::new()
            .with_transformation(Identity)
            .with_transformation(Dilation::new(3.0));
        let outer = Pipeline::new()
            .with_transformation(inner)
            .with_transformation(Reflection::new(0));
        assert_eq!(
            Transformation::name(&outer),
            "Identity -> Dilation(factor=3.0) -> Reflection(axis=0)"
        );
    }

    #[test]
    fn test_solve_captures_linalg_errors() -> Result<(), SolverError> {
        let pipeline = Pipeline::new().with_solver(Exact).with_solver(PseudoInverse);
        let x = array![[1.0, 2.0], [2.0, 4.0]];
        let y = array![[1.0], [2.0]];

        let results = pipeline.solve(&x, &y)?;
        assert_eq!(results.len(), 2);
        assert_eq!(
            results["Exact Solver"],
            SolveOutcome::Failed("Singular matrix".to_string())
        );
        assert!(results["Moore-Penrose Pseudo-Inverse"].solution().is_some());
        Ok(())
    }

    #[test]
    fn test_solve_propagates_other_errors() {
        let pipeline = Pipeline::new()
            .with_solver(Exact)
            .with_solver(Misconfigured);
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![[1.0], [2.0]];
        assert!(matches!(
            pipeline.solve(&x, &y),
            Err(SolverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_solve_propagates_exact_row_mismatch() {
        let pipeline = Pipeline::new().with_solver(LeastSquares).with_solver(Exact);
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![[1.0], [2.0], [3.0]];
        assert!(matches!(
            pipeline.solve(&x, &y),
            Err(SolverError::ShapeMismatch([2, 2], [3, 1]))
        ));
    }

    #[test]
    fn test_from_parts() -> Result<(), Box<dyn std::error::Error>> {
        let pipeline = Pipeline::from_parts(
            vec![
                Box::new(Dilation::new(2.0)),
                Box::new(Identity),
                Box::new(Translation::new(array![1.0, -1.0])),
            ],
            vec![Box::new(Exact), Box::new(LeastSquares)],
        );

        let names: Vec<String> = pipeline.transformations().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            ["Dilation(factor=2.0)", "Identity", "Translation(offset=[1.0, -1.0])"]
        );
        let names: Vec<String> = pipeline.solvers().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Exact Solver", "Least Squares"]);

        let out = pipeline.apply(&array![[1.0, 2.0]].into_dyn())?;
        assert_eq!(out, array![[3.0, 3.0]].into_dyn());

        let x = array![[2.0, 0.0], [0.0, 4.0]];
        let y = array![[2.0], [8.0]];
        let results = pipeline.solve(&x, &y)?;
        assert_eq!(results.len(), 2);
        for outcome in results.values() {
            let beta = outcome.solution().ok_or("solver failed")?;
            assert_eq!(beta.dim(), (2, 1));
            assert!((beta[[0, 0]] - 1.0).abs() < 1e-12);
            assert!((beta[[1, 0]] - 2.0).abs() < 1e-12);
        }

        let empty = Pipeline::from_parts(Vec::new(), Vec::new());
        assert!(empty.transformations().is_empty());
        assert!(empty.solvers().is_empty());
        assert!(empty.solve(&x, &y)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_names_keep_the_later_solver() -> Result<(), SolverError> {
        let pipeline = Pipeline::new()
            .with_solver(Constant("same", 1.0))
            .with_solver(Constant("same", 2.0));
        let results = pipeline.solve(&array![[1.0]], &array![[1.0]])?;
        assert_eq!(results.len(), 1);
        assert_eq!(results["same"], SolveOutcome::Solution(array![[2.0]]));
        Ok(())
    }
}
