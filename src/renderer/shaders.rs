//! GLSL ES 3.00 programs used by the render passes.
//!
//! Vertex attributes shared by all programs:
//! - `aPosition`: vec3, model space
//! - `aNormal`: vec3
//! - `aFilter`: vec4 `(start time, end time, start value, end value)`; the
//!   vertex is scaled by the value interpolated at `uTime` and hidden at 0
//! - `aID`: vec3 identity color, see `picking`

use super::shader::ShaderSource;

pub const BUILDINGS: ShaderSource = ShaderSource {
    name: "building shader",
    vertex: BUILDINGS_VERTEX,
    fragment: BUILDINGS_FRAGMENT,
    attributes: &["aPosition", "aTexCoord", "aColor", "aFilter", "aNormal", "aID"],
    uniforms: &[
        "uModelMatrix",
        "uViewDirOnMap",
        "uMatrix",
        "uNormalTransform",
        "uLightColor",
        "uLightDirection",
        "uLowerEdgePoint",
        "uFogDistance",
        "uFogBlurDistance",
        "uHighlightColor",
        "uHighlightID",
        "uTime",
        "uWallTexIndex",
    ],
};

pub const BUILDINGS_SHADOWS: ShaderSource = ShaderSource {
    name: "quality building shader",
    vertex: BUILDINGS_SHADOWS_VERTEX,
    fragment: BUILDINGS_SHADOWS_FRAGMENT,
    attributes: &["aPosition", "aTexCoord", "aColor", "aFilter", "aNormal", "aID"],
    uniforms: &[
        "uFogDistance",
        "uFogBlurDistance",
        "uHighlightColor",
        "uHighlightID",
        "uLightColor",
        "uLightDirection",
        "uLowerEdgePoint",
        "uMatrix",
        "uModelMatrix",
        "uSunMatrix",
        "uShadowTexIndex",
        "uShadowTexDimensions",
        "uTime",
        "uViewDirOnMap",
        "uWallTexIndex",
    ],
};

pub const PICKING: ShaderSource = ShaderSource {
    name: "picking shader",
    vertex: PICKING_VERTEX,
    fragment: PICKING_FRAGMENT,
    attributes: &["aPosition", "aID", "aFilter"],
    uniforms: &[
        "uModelMatrix",
        "uMatrix",
        "uViewDirOnMap",
        "uLowerEdgePoint",
        "uFogDistance",
        "uFogBlurDistance",
        "uTime",
    ],
};

pub const FOG_NORMAL: ShaderSource = ShaderSource {
    name: "fog/normal shader",
    vertex: FOG_NORMAL_VERTEX,
    fragment: FOG_NORMAL_FRAGMENT,
    attributes: &["aPosition", "aFilter", "aNormal"],
    uniforms: &[
        "uMatrix",
        "uModelMatrix",
        "uNormalMatrix",
        "uTime",
        "uFogDistance",
        "uFogBlurDistance",
        "uViewDirOnMap",
        "uLowerEdgePoint",
    ],
};

pub const MAP_SHADOWS: ShaderSource = ShaderSource {
    name: "map shadows shader",
    vertex: MAP_SHADOWS_VERTEX,
    fragment: MAP_SHADOWS_FRAGMENT,
    attributes: &["aPosition", "aNormal"],
    uniforms: &[
        "uModelMatrix",
        "uViewDirOnMap",
        "uMatrix",
        "uDirToSun",
        "uLowerEdgePoint",
        "uFogDistance",
        "uFogBlurDistance",
        "uShadowTexDimensions",
        "uShadowStrength",
        "uShadowTexIndex",
        "uSunMatrix",
    ],
};

const BUILDINGS_VERTEX: &str = r#"#version 300 es
precision highp float;
in vec3 aPosition;
in vec2 aTexCoord;
in vec3 aNormal;
in vec3 aColor;
in vec4 aFilter;
in vec3 aID;
uniform mat4 uModelMatrix;
uniform mat4 uMatrix;
uniform mat3 uNormalTransform;
uniform vec3 uLightDirection;
uniform vec3 uLightColor;
uniform vec3 uHighlightColor;
uniform vec3 uHighlightID;
uniform vec2 uViewDirOnMap;
uniform vec2 uLowerEdgePoint;
uniform float uFogDistance;
uniform float uFogBlurDistance;
uniform float uTime;
out vec3 vColor;
out vec2 vTexCoord;
out float vFogIntensity;

float filterValue() {
    float t = clamp((uTime - aFilter.x) / max(aFilter.y - aFilter.x, 0.0001), 0.0, 1.0);
    return mix(aFilter.z, aFilter.w, t);
}

void main() {
    float f = filterValue();
    if (f == 0.0) {
        gl_Position = vec4(0.0);
        vColor = vec3(0.0);
        vTexCoord = vec2(0.0);
        vFogIntensity = 1.0;
        return;
    }
    vec4 pos = vec4(aPosition.xy, aPosition.z * f, 1.0);
    gl_Position = uMatrix * pos;

    vec3 color = aColor;
    if (uHighlightID != vec3(0.0) && distance(aID, uHighlightID) < 0.001) {
        color = mix(aColor, uHighlightColor, 0.5);
    }
    vec3 normal = normalize(uNormalTransform * aNormal);
    float intensity = max(dot(normal, uLightDirection), 0.0) / 1.5;
    vColor = color + uLightColor * intensity;
    vTexCoord = aTexCoord;

    vec4 worldPos = uModelMatrix * pos;
    float distanceOnMap = dot(worldPos.xy - uLowerEdgePoint, uViewDirOnMap);
    vFogIntensity = clamp((distanceOnMap - uFogDistance) / uFogBlurDistance, 0.0, 1.0);
}
"#;

const BUILDINGS_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec3 vColor;
in vec2 vTexCoord;
in float vFogIntensity;
uniform sampler2D uWallTexIndex;
out vec4 FRAG_COLOR;
void main() {
    vec3 color = vColor * texture(uWallTexIndex, vTexCoord).rgb;
    FRAG_COLOR = vec4(color, 1.0 - vFogIntensity);
}
"#;

const BUILDINGS_SHADOWS_VERTEX: &str = r#"#version 300 es
precision highp float;
in vec3 aPosition;
in vec2 aTexCoord;
in vec3 aNormal;
in vec3 aColor;
in vec4 aFilter;
in vec3 aID;
uniform mat4 uModelMatrix;
uniform mat4 uMatrix;
uniform mat4 uSunMatrix;
uniform vec3 uHighlightColor;
uniform vec3 uHighlightID;
uniform vec2 uViewDirOnMap;
uniform vec2 uLowerEdgePoint;
uniform float uFogDistance;
uniform float uFogBlurDistance;
uniform float uTime;
out vec3 vColor;
out vec3 vNormal;
out vec2 vTexCoord;
out vec4 vSunRelPosition;
out float vFogIntensity;

float filterValue() {
    float t = clamp((uTime - aFilter.x) / max(aFilter.y - aFilter.x, 0.0001), 0.0, 1.0);
    return mix(aFilter.z, aFilter.w, t);
}

void main() {
    float f = filterValue();
    if (f == 0.0) {
        gl_Position = vec4(0.0);
        vColor = vec3(0.0);
        vNormal = vec3(0.0, 0.0, 1.0);
        vTexCoord = vec2(0.0);
        vSunRelPosition = vec4(0.0);
        vFogIntensity = 1.0;
        return;
    }
    vec4 pos = vec4(aPosition.xy, aPosition.z * f, 1.0);
    gl_Position = uMatrix * pos;
    vSunRelPosition = uSunMatrix * pos;

    vColor = aColor;
    if (uHighlightID != vec3(0.0) && distance(aID, uHighlightID) < 0.001) {
        vColor = mix(aColor, uHighlightColor, 0.5);
    }
    vNormal = aNormal;
    vTexCoord = aTexCoord;

    vec4 worldPos = uModelMatrix * pos;
    float distanceOnMap = dot(worldPos.xy - uLowerEdgePoint, uViewDirOnMap);
    vFogIntensity = clamp((distanceOnMap - uFogDistance) / uFogBlurDistance, 0.0, 1.0);
}
"#;

const BUILDINGS_SHADOWS_FRAGMENT: &str = r#"#version 300 es
precision highp float;
in vec3 vColor;
in vec3 vNormal;
in vec2 vTexCoord;
in vec4 vSunRelPosition;
in float vFogIntensity;
uniform vec3 uLightColor;
uniform vec3 uLightDirection;
uniform vec2 uShadowTexDimensions;
uniform sampler2D uShadowTexIndex;
uniform sampler2D uWallTexIndex;
out vec4 FRAG_COLOR;

float isSeenBySun(vec2 coords, float depth) {
    if (any(lessThan(coords, vec2(0.0))) || any(greaterThan(coords, vec2(1.0)))) {
        return 1.0;
    }
    return depth - 0.0005 < texture(uShadowTexIndex, coords).x ? 1.0 : 0.0;
}

float sunVisibility() {
    vec3 coords = vSunRelPosition.xyz / vSunRelPosition.w * 0.5 + 0.5;
    vec2 texel = 1.0 / uShadowTexDimensions;
    float sum = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            sum += isSeenBySun(coords.xy + vec2(x, y) * texel, coords.z);
        }
    }
    return sum / 9.0;
}

void main() {
    float diffuse = max(dot(normalize(vNormal), uLightDirection), 0.0);
    float light = diffuse * sunVisibility();
    vec3 color = (vColor + uLightColor * light / 1.5) * texture(uWallTexIndex, vTexCoord).rgb;
    FRAG_COLOR = vec4(color, 1.0 - vFogIntensity);
}
"#;

const PICKING_VERTEX: &str = r#"#version 300 es
precision highp float;
in vec3 aPosition;
in vec3 aID;
in vec4 aFilter;
uniform mat4 uModelMatrix;
uniform mat4 uMatrix;
uniform vec2 uViewDirOnMap;
uniform vec2 uLowerEdgePoint;
uniform float uFogDistance;
uniform float uFogBlurDistance;
uniform float uTime;
out vec3 vID;
void main() {
    float t = clamp((uTime - aFilter.x) / max(aFilter.y - aFilter.x, 0.0001), 0.0, 1.0);
    float f = mix(aFilter.z, aFilter.w, t);
    if (f == 0.0) {
        gl_Position = vec4(0.0);
        vID = vec3(0.0);
        return;
    }
    vec4 pos = vec4(aPosition.xy, aPosition.z * f, 1.0);
    gl_Position = uMatrix * pos;
    vec4 worldPos = uModelMatrix * pos;
    // Only geometry lost completely in the fog is unpickable.
    float distanceOnMap = dot(worldPos.xy - uLowerEdgePoint, uViewDirOnMap);
    float fog = clamp((distanceOnMap - uFogDistance) / uFogBlurDistance, 0.0, 1.0);
    vID = fog >= 1.0 ? vec3(0.0) : aID;
}
"#;

const PICKING_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec3 vID;
out vec4 FRAG_COLOR;
void main() {
    FRAG_COLOR = vec4(vID, 1.0);
}
"#;

const FOG_NORMAL_VERTEX: &str = r#"#version 300 es
precision highp float;
in vec3 aPosition;
in vec3 aNormal;
in vec4 aFilter;
uniform mat4 uMatrix;
uniform mat4 uModelMatrix;
uniform mat3 uNormalMatrix;
uniform vec2 uViewDirOnMap;
uniform vec2 uLowerEdgePoint;
uniform float uFogDistance;
uniform float uFogBlurDistance;
uniform float uTime;
out vec3 vNormal;
out float vFogIntensity;
void main() {
    float t = clamp((uTime - aFilter.x) / max(aFilter.y - aFilter.x, 0.0001), 0.0, 1.0);
    float f = mix(aFilter.z, aFilter.w, t);
    if (f == 0.0) {
        gl_Position = vec4(0.0);
        vNormal = vec3(0.0);
        vFogIntensity = 0.0;
        return;
    }
    vec4 pos = vec4(aPosition.xy, aPosition.z * f, 1.0);
    gl_Position = uMatrix * pos;
    vNormal = uNormalMatrix * aNormal;

    vec4 worldPos = uModelMatrix * pos;
    float distanceOnMap = dot(worldPos.xy - uLowerEdgePoint, uViewDirOnMap);
    vFogIntensity = clamp((distanceOnMap - uFogDistance) / uFogBlurDistance, 0.0, 1.0);
}
"#;

const FOG_NORMAL_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec3 vNormal;
in float vFogIntensity;
out vec4 FRAG_COLOR;
void main() {
    FRAG_COLOR = vec4(normalize(vNormal) * 0.5 + 0.5, clamp(vFogIntensity, 0.0, 1.0));
}
"#;

const MAP_SHADOWS_VERTEX: &str = r#"#version 300 es
precision highp float;
in vec3 aPosition;
in vec3 aNormal;
uniform mat4 uModelMatrix;
uniform mat4 uMatrix;
uniform mat4 uSunMatrix;
uniform vec2 uViewDirOnMap;
uniform vec2 uLowerEdgePoint;
uniform float uFogDistance;
uniform float uFogBlurDistance;
out vec3 vNormal;
out vec4 vSunRelPosition;
out float vFogIntensity;
void main() {
    vec4 pos = vec4(aPosition, 1.0);
    gl_Position = uMatrix * pos;
    vSunRelPosition = uSunMatrix * pos;
    vNormal = aNormal;

    vec4 worldPos = uModelMatrix * pos;
    float distanceOnMap = dot(worldPos.xy - uLowerEdgePoint, uViewDirOnMap);
    vFogIntensity = clamp((distanceOnMap - uFogDistance) / uFogBlurDistance, 0.0, 1.0);
}
"#;

const MAP_SHADOWS_FRAGMENT: &str = r#"#version 300 es
precision highp float;
in vec3 vNormal;
in vec4 vSunRelPosition;
in float vFogIntensity;
uniform vec3 uDirToSun;
uniform vec2 uShadowTexDimensions;
uniform float uShadowStrength;
uniform sampler2D uShadowTexIndex;
out vec4 FRAG_COLOR;

float isSeenBySun(vec2 coords, float depth) {
    if (any(lessThan(coords, vec2(0.0))) || any(greaterThan(coords, vec2(1.0)))) {
        return 1.0;
    }
    return depth - 0.0005 < texture(uShadowTexIndex, coords).x ? 1.0 : 0.0;
}

void main() {
    vec3 coords = vSunRelPosition.xyz / vSunRelPosition.w * 0.5 + 0.5;
    vec2 texel = 1.0 / uShadowTexDimensions;
    float visibility = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            visibility += isSeenBySun(coords.xy + vec2(x, y) * texel, coords.z);
        }
    }
    visibility /= 9.0;
    float light = max(dot(normalize(vNormal), uDirToSun), 0.0) * visibility;
    FRAG_COLOR = vec4(vec3(0.0), (1.0 - light) * uShadowStrength * (1.0 - vFogIntensity));
}
"#;
